// syscomb-core/tests/combination_integration_tests.rs
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use test_log::test;

use syscomb_core::batch::{NORMALIZED_OUTPUT_NAME, RAW_OUTPUT_NAME};
use syscomb_core::{
    read_kwslist, run_combination, CombinationMethod, CombinationRequest, Detection, DetectionList,
    Keyword, KwList, ReadOptions, RunSettings, SyscombError, SystemCombiner, ZeroWeightPolicy,
};

const KWLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kwlist ecf_filename="test.ecf.xml" version="1" language="zulu" encoding="UTF-8">
  <kw kwid="K1"><kwtext>sawubona</kwtext></kw>
  <kw kwid="K2"><kwtext>ngiyabonga</kwtext></kw>
</kwlist>
"#;

const SYSTEM_A: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kwslist kwlist_filename="test.kwlist.xml" language="zulu" system_id="a">
  <detected_kwlist kwid="K1" search_time="1" oov_count="0">
    <kw file="file1" channel="1" tbeg="0.00" dur="1.00" score="0.8" decision="YES"/>
    <kw file="file1" channel="1" tbeg="5.00" dur="0.50" score="0.0" decision="NO"/>
  </detected_kwlist>
  <detected_kwlist kwid="K2" search_time="1" oov_count="0">
    <kw file="file2" channel="1" tbeg="2.00" dur="0.40" score="0.3" decision="NO"/>
  </detected_kwlist>
</kwslist>
"#;

const SYSTEM_B: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kwslist kwlist_filename="test.kwlist.xml" language="zulu" system_id="b">
  <detected_kwlist kwid="K1" search_time="1" oov_count="0">
    <kw file="file1" channel="1" tbeg="0.50" dur="1.00" score="0.6" decision="YES"/>
  </detected_kwlist>
  <detected_kwlist kwid="K2" search_time="1" oov_count="0"/>
</kwslist>
"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn settings(kwlist_file: PathBuf) -> RunSettings {
    RunSettings {
        language_code: "206".into(),
        language: "zulu".into(),
        corpus: "dev".into(),
        kwlist_id: "dev".into(),
        kwlist_file,
        beta: 999.9,
        total_duration: 3600.0,
        posterior_boost: 1.0,
    }
}

#[test]
fn test_run_combination_writes_both_lists() -> Result<()> {
    let dir = tempdir()?;
    let kwlist_file = write(dir.path(), "test.kwlist.xml", KWLIST);
    let a = write(dir.path(), "a.xml", SYSTEM_A);
    let b = write(dir.path(), "b.xml", SYSTEM_B);
    let out_dir = dir.path().join("out").join("nested");

    let request = CombinationRequest {
        settings: settings(kwlist_file.clone()),
        method: "sum".into(),
        inputs: vec![a, b],
        weights: None,
        output_dir: out_dir.clone(),
        zero_weight: ZeroWeightPolicy::Fail,
        system_id: "combo".into(),
    };
    let summary = run_combination(&request)?;

    assert_eq!(summary.keywords, 2);
    assert_eq!(summary.inputs, 2);
    // The zero-score hit of system A is dropped on load.
    assert_eq!(summary.input_detections, 3);
    assert_eq!(summary.output_detections, 2);
    assert_eq!(summary.raw_output, out_dir.join(RAW_OUTPUT_NAME));
    assert!(summary.normalized_output.ends_with(NORMALIZED_OUTPUT_NAME));

    let kwlist = KwList::load_from_file(&kwlist_file)?;
    let raw = read_kwslist(&summary.raw_output, &kwlist, ReadOptions::default())?;
    assert_eq!(raw.language, "zulu");
    assert_eq!(raw.system_id, "combo");
    assert_eq!(raw.kwlist_filename, "test.kwlist.xml");

    let k1 = raw.get("K1").unwrap();
    assert_eq!(k1.len(), 1);
    // 0.8 + 0.6 = 1.4, normalized by the keyword maximum.
    assert_eq!(k1[0].score, 1.0);
    assert!((k1[0].start_time - 0.21).abs() < 1e-9);
    assert_eq!(k1[0].decision, Some(true));

    let k2 = raw.get("K2").unwrap();
    assert_eq!(k2.len(), 1);
    assert!((k2[0].score - 0.3).abs() < 1e-9);

    let normalized = read_kwslist(&summary.normalized_output, &kwlist, ReadOptions::default())?;
    for entry in normalized.entries() {
        for det in &entry.detections {
            assert!(det.score >= 0.0 && det.score <= 1.0);
            // YES exactly when the normalized score reaches one half.
            assert_eq!(det.decision, Some(det.score >= 0.5 - 1e-6));
        }
    }
    Ok(())
}

#[test]
fn test_missing_input_file_is_reported() -> Result<()> {
    let dir = tempdir()?;
    let kwlist_file = write(dir.path(), "test.kwlist.xml", KWLIST);
    let request = CombinationRequest {
        settings: settings(kwlist_file),
        method: "max".into(),
        inputs: vec![dir.path().join("missing.xml")],
        weights: None,
        output_dir: dir.path().join("out"),
        zero_weight: ZeroWeightPolicy::Fail,
        system_id: String::new(),
    };
    let err = run_combination(&request).unwrap_err();
    assert!(matches!(err, SyscombError::Input(_)));
    assert!(err.to_string().contains("missing.xml"));
    assert!(!dir.path().join("out").exists());
    Ok(())
}

#[test]
fn test_zero_weight_policies_through_the_runner() -> Result<()> {
    let dir = tempdir()?;
    let kwlist_file = write(dir.path(), "test.kwlist.xml", KWLIST);
    let a = write(dir.path(), "a.xml", SYSTEM_A);

    let mut request = CombinationRequest {
        settings: settings(kwlist_file),
        method: "anz".into(),
        inputs: vec![a],
        weights: Some(vec![0.0]),
        output_dir: dir.path().join("out"),
        zero_weight: ZeroWeightPolicy::Fail,
        system_id: String::new(),
    };
    let err = run_combination(&request).unwrap_err();
    assert!(err.is_arithmetic());

    request.zero_weight = ZeroWeightPolicy::Unweighted;
    let summary = run_combination(&request)?;
    assert_eq!(summary.output_detections, 2);
    Ok(())
}

/// Deterministic pseudo-random detections so the invariants below are
/// checked on something messier than hand-written cases.
fn scatter(seed: u64, files: &[&str], n: usize) -> Vec<Detection> {
    let mut state = seed;
    let mut next = || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) as f64) / ((1u64 << 31) as f64)
    };
    (0..n)
        .map(|_| {
            let file = files[(next() * files.len() as f64) as usize % files.len()];
            let start = next() * 60.0;
            let dur = 0.05 + next() * 1.5;
            let score = 0.01 + next() * 0.99;
            Detection::new(file, start, start + dur, score)
        })
        .collect()
}

#[test]
fn test_output_invariants_hold_for_every_method() -> Result<()> {
    let kwlist = KwList::from_keywords(vec![
        Keyword { id: "K1".into(), text: "a".into() },
        Keyword { id: "K2".into(), text: "b".into() },
    ])?;
    let files = ["f1", "f2", "f3"];
    let inputs: Vec<DetectionList> = (0..3)
        .map(|i| {
            let mut list = DetectionList::new(&kwlist);
            for (k, kw) in ["K1", "K2"].iter().enumerate() {
                for det in scatter(17 + i * 31 + k as u64, &files, 40) {
                    list.push(kw, det);
                }
            }
            list
        })
        .collect();

    for method in CombinationMethod::ALL {
        let combiner = SystemCombiner::new(method, vec![1.0, 0.5, 2.0])?;
        let out = combiner.combine(&kwlist, &inputs)?;
        for entry in out.entries() {
            let max = entry.detections.iter().map(|d| d.score).fold(0.0, f64::max);
            assert!(max <= 1.0 + 1e-12, "{}: max {}", method, max);

            let mut dets: Vec<&Detection> = entry.detections.iter().collect();
            dets.sort_by(|a, b| a.key_cmp(b));
            for pair in dets.windows(2) {
                if pair[0].filename == pair[1].filename {
                    assert!(
                        pair[0].end_time <= pair[1].start_time + 1e-9,
                        "{}: {:?} overlaps {:?}",
                        method,
                        pair[0],
                        pair[1]
                    );
                }
            }
        }
    }
    Ok(())
}
