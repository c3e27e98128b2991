use std::fs::File;
use std::io::BufReader;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::tempdir;

use rusty_psth::analysis::Analysis;
use rusty_psth::config::AnalysisConfig;
use rusty_psth::session::{Epoch, EventSource, Session, TrialSource, UnitFilter};

const SEED: u64 = 42;
const NUM_TRIALS: usize = 100;
const PERIOD: f64 = 1.0;
const DURATION: f64 = 0.25;

/// A session where the first units fire a short burst after every onset, on top of a uniform background.
fn rand_session<R: Rng>(num_units: usize, num_responsive: usize, rng: &mut R) -> Session {
    let onsets: Vec<f64> = (0..NUM_TRIALS).map(|n| 1.0 + n as f64 * PERIOD).collect();
    let end = 1.0 + NUM_TRIALS as f64 * PERIOD;

    let mut spike_times = vec![];
    let mut spike_times_index = vec![];
    for unit in 0..num_units {
        let mut times: Vec<f64> = (0..(5.0 * end) as usize)
            .map(|_| rng.gen_range(0.0..end))
            .collect();
        if unit < num_responsive {
            for onset in onsets.iter() {
                times.extend((0..3).map(|_| onset + rng.gen_range(0.01..0.05)));
            }
        }
        times.sort_by(|a, b| a.partial_cmp(b).unwrap());
        spike_times.extend(times);
        spike_times_index.push(spike_times.len());
    }

    let epochs = vec![Epoch {
        name: "RepeatFFF".to_string(),
        start_time: onsets.clone(),
        stop_time: onsets.iter().map(|onset| onset + DURATION).collect(),
    }];

    Session::from_ragged("synthetic", &spike_times, &spike_times_index, epochs).unwrap()
}

#[test]
fn test_session_round_trip() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");

    let session = rand_session(3, 1, &mut rng);
    session.save_to(&path).unwrap();

    let loaded = Session::load_from(&path).unwrap();
    assert_eq!(loaded, session);
    assert_eq!(loaded.trials("RepeatFFF").unwrap().len(), NUM_TRIALS);
    assert_eq!(loaded.events(2).unwrap(), session.events(2).unwrap());
}

#[test]
fn test_responsive_units_are_detected() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let session = rand_session(10, 3, &mut rng);

    let config = AnalysisConfig {
        pre_margin: 0.1,
        post_margin: 0.3,
        bin_width: 0.01,
        range_start: -0.1,
        range_end: 0.3,
        min_ratio: 2.0,
        min_evoked_count: 10,
        ..AnalysisConfig::default()
    };
    let analysis = Analysis::new(config).unwrap();

    let unit_ids = session.select_units(&UnitFilter {
        min_firing_rate: 1.0,
        max_units: None,
        ..UnitFilter::default()
    });
    assert_eq!(unit_ids.len(), 10);

    let report = analysis.run(&session, &unit_ids, "RepeatFFF").unwrap();
    assert_eq!(report.num_trials, NUM_TRIALS);
    assert_relative_eq!(report.mean_duration.unwrap(), DURATION, epsilon = 1e-9);
    assert_eq!(report.units.len(), 10);

    let mut responsive = report.responsive_units();
    responsive.sort();
    assert_eq!(responsive, vec![0, 1, 2]);

    for unit in report.units.iter() {
        assert_eq!(unit.trials.len(), NUM_TRIALS);
        assert_eq!(unit.histogram.num_bins(), 40);
        assert!(unit.histogram.rates().iter().all(|rate| *rate >= 0.0));
    }

    // The burst lies in the bins [10 ms, 50 ms) after onset
    let burst = &report.units[0].histogram;
    let background = &report.units[5].histogram;
    let burst_rate: f64 = burst.rates()[11..15].iter().sum::<f64>() / 4.0;
    let background_rate: f64 = background.rates()[11..15].iter().sum::<f64>() / 4.0;
    assert!(burst_rate > 5.0 * background_rate);

    // Responsive units share the burst, hence correlate more with each other than with a background unit
    let correlations = report.correlations.as_ref().unwrap();
    assert!(correlations[0][1] > correlations[0][5]);
}

#[test]
fn test_report_save() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let session = rand_session(2, 1, &mut rng);
    let analysis = Analysis::new(AnalysisConfig {
        max_trials: Some(20),
        ..AnalysisConfig::default()
    })
    .unwrap();

    let report = analysis.run(&session, &[0, 1], "RepeatFFF").unwrap();
    assert_eq!(report.num_trials, 20);

    let dir = tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.save_to(&path).unwrap();

    let reader = BufReader::new(File::open(&path).unwrap());
    let json: serde_json::Value = serde_json::from_reader(reader).unwrap();
    assert_eq!(json["epoch"], "RepeatFFF");
    assert_eq!(json["num_trials"], 20);
    assert_eq!(json["units"].as_array().unwrap().len(), 2);
    assert_eq!(json["units"][0]["trials"].as_array().unwrap().len(), 20);
    assert_eq!(json["config"]["max_trials"], 20);
}
