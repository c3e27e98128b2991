use approx::assert_relative_eq;

use rusty_psth::core::align::align;
use rusty_psth::core::events::EventTimeSeries;
use rusty_psth::core::histogram::histogram;
use rusty_psth::core::trial::TrialSet;
use rusty_psth::error::PsthError;

#[test]
fn test_two_trials_one_silent() {
    let events = EventTimeSeries::build(vec![0.5, 1.2, 1.25, 3.0]).unwrap();
    let trials = TrialSet::from_pairs(&[(1.0, 1.1), (2.0, 2.1)]).unwrap();

    let aligned = align(&events, &trials, 0.1, 0.3).unwrap();
    assert_eq!(aligned.len(), 2);
    assert_eq!(aligned[0].len(), 2);
    assert_relative_eq!(aligned[0].times()[0], 0.2, epsilon = 1e-12);
    assert_relative_eq!(aligned[0].times()[1], 0.25, epsilon = 1e-12);
    assert!(aligned[1].is_empty());

    let psth = histogram(&aligned, 0.1, 0.0, 0.3).unwrap();
    assert_eq!(psth.counts(), &[0, 0, 2]);
    assert_eq!(psth.num_trials(), 2);
    assert_relative_eq!(psth.rates()[0], 0.0);
    assert_relative_eq!(psth.rates()[1], 0.0);
    assert_relative_eq!(psth.rates()[2], 10.0, epsilon = 1e-9);
}

#[test]
fn test_no_events() {
    let trials = TrialSet::from_pairs(&[(0.0, 1.0)]).unwrap();
    let aligned = align(&EventTimeSeries::new_empty(), &trials, 0.05, 1.0).unwrap();
    assert_eq!(aligned.len(), 1);
    assert!(aligned[0].is_empty());

    for bin_width in [0.001, 0.01, 0.3] {
        let psth = histogram(&aligned, bin_width, -0.05, 1.0).unwrap();
        assert!(psth.rates().iter().all(|rate| *rate == 0.0));
    }
}

#[test]
fn test_shared_event_between_overlapping_trials() {
    let events = EventTimeSeries::build(vec![5.05]).unwrap();
    let trials = TrialSet::from_pairs(&[(5.0, 5.1), (5.05, 5.15)]).unwrap();

    let aligned = align(&events, &trials, 0.0, 0.1).unwrap();
    assert_eq!(aligned.len(), 2);
    assert_eq!(aligned[0].len(), 1);
    assert_relative_eq!(aligned[0].times()[0], 0.05, epsilon = 1e-12);
    assert_eq!(aligned[1].times(), &[0.0]);
}

#[test]
fn test_invalid_arguments() {
    let events = EventTimeSeries::build(vec![0.5, 1.2]).unwrap();
    let trials = TrialSet::from_pairs(&[(1.0, 1.1)]).unwrap();

    assert!(matches!(
        align(&events, &trials, -0.01, 0.1),
        Err(PsthError::InvalidArgument(_))
    ));
    assert!(matches!(
        histogram(&[], 0.1, 0.0, 1.0),
        Err(PsthError::InvalidArgument(_))
    ));

    let aligned = align(&events, &trials, 0.1, 0.3).unwrap();
    assert!(matches!(
        histogram(&aligned, 0.0, 0.0, 1.0),
        Err(PsthError::InvalidArgument(_))
    ));
}
