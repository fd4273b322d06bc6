//! Driver integration tests.
//!
//! These run the full loop over in-memory traces: parse, schedule, echo,
//! shutdown, and the interruption path.

use hourglass::{
    Driver, Error, LineEmitter, RunOutcome, Scheduler, SchedulerConfig, UtilizationLog,
};

fn tiny_config() -> SchedulerConfig {
    SchedulerConfig {
        floor: 1,
        ..Default::default()
    }
}

fn driver(config: SchedulerConfig) -> Driver<LineEmitter<Vec<u8>>> {
    Driver::new(
        Scheduler::new(config).unwrap(),
        LineEmitter::new(Vec::new()),
    )
}

fn output(driver: Driver<LineEmitter<Vec<u8>>>) -> Vec<String> {
    let (_, emitter, _) = driver.into_parts();
    String::from_utf8(emitter.into_inner())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn commands_interleave_with_verbatim_echoes() {
    let trace = b"2013-03-01 00:00:27 uid1 export 10.999\n\
                  2013-03-01 00:00:30 uid2 url 1\n" as &[u8];
    let mut driver = driver(tiny_config());
    let outcome = driver.run(trace, std::future::pending()).await.unwrap();
    assert_eq!(outcome, RunOutcome::Eof);

    assert_eq!(
        output(driver),
        vec![
            "2013-03-01 00:00:27 launch export",
            "2013-03-01 00:00:27 launch url",
            "2013-03-01 00:00:27 launch general",
            "2013-03-01 00:00:27 uid1 export 10.999",
            "2013-03-01 00:00:30 uid2 url 1",
            "2013-03-01 00:00:30 terminate export",
            "2013-03-01 00:00:30 terminate url",
            "2013-03-01 00:00:30 terminate general",
        ]
    );
}

#[tokio::test]
async fn contest_defaults_single_job_trace() {
    let trace = b"2013-03-01 00:00:27 uid1 export 10.999\n" as &[u8];
    let mut driver = driver(SchedulerConfig::default());
    driver.run(trace, std::future::pending()).await.unwrap();

    let out = output(driver);
    // 120 launches, the echoed job, 120 shutdown terminations.
    assert_eq!(out.len(), 241);
    assert!(
        out[..120]
            .iter()
            .all(|l| l.starts_with("2013-03-01 00:00:27 launch"))
    );
    assert_eq!(
        out.iter().filter(|l| l.ends_with("launch export")).count(),
        40
    );
    assert_eq!(out.iter().filter(|l| l.ends_with("launch url")).count(), 40);
    assert_eq!(
        out.iter().filter(|l| l.ends_with("launch general")).count(),
        40
    );
    assert_eq!(out[120], "2013-03-01 00:00:27 uid1 export 10.999");
    assert!(
        out[121..]
            .iter()
            .all(|l| l.starts_with("2013-03-01 00:00:27 terminate"))
    );
    assert_eq!(out.len() - 121, 120);
}

#[tokio::test]
async fn every_job_line_is_echoed_exactly_once_in_order() {
    let trace = b"2013-03-01 00:00:00 a export 1\n\
                  2013-03-01 00:01:00 b url 2.5\n\
                  2013-03-01 00:02:00 c general 0\n\
                  2013-03-01 00:03:00 d export 10\n" as &[u8];
    let mut driver = driver(tiny_config());
    driver.run(trace, std::future::pending()).await.unwrap();

    let job_shape = |l: &String| l.split_whitespace().count() == 5;
    let echoed: Vec<String> = output(driver).into_iter().filter(job_shape).collect();
    assert_eq!(
        echoed,
        vec![
            "2013-03-01 00:00:00 a export 1",
            "2013-03-01 00:01:00 b url 2.5",
            "2013-03-01 00:02:00 c general 0",
            "2013-03-01 00:03:00 d export 10",
        ]
    );
}

#[tokio::test]
async fn empty_input_emits_nothing() {
    let mut driver = driver(tiny_config());
    let outcome = driver
        .run(b"" as &[u8], std::future::pending())
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::Eof);
    assert!(output(driver).is_empty());
}

#[tokio::test]
async fn malformed_line_aborts_the_run() {
    let trace = b"2013-03-01 00:00:27 uid1 export 10.999\n\
                  this is not a record\n" as &[u8];
    let mut driver = driver(tiny_config());
    let err = driver
        .run(trace, std::future::pending())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn unknown_queue_aborts_the_run() {
    let trace = b"2013-03-01 00:00:27 uid1 batch 10.999\n" as &[u8];
    let mut driver = driver(tiny_config());
    let err = driver
        .run(trace, std::future::pending())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownQueue(name) if name == "batch"));
}

#[tokio::test]
async fn interruption_skips_the_terminate_burst() {
    let trace = b"2013-03-01 00:00:27 uid1 export 10.999\n" as &[u8];
    let mut driver = driver(tiny_config());
    // A shutdown condition that is already met wins over ready input.
    let outcome = driver.run(trace, std::future::ready(())).await.unwrap();
    assert_eq!(outcome, RunOutcome::Interrupted);
    assert!(output(driver).is_empty());
}

#[tokio::test]
async fn utilization_log_gets_one_line_per_job() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("util.log");

    let trace = b"2013-03-01 00:00:27 uid1 export 10.999\n\
                  2013-03-01 00:00:30 uid2 url 1\n" as &[u8];
    let scheduler = Scheduler::new(tiny_config()).unwrap();
    let mut driver = Driver::new(scheduler, LineEmitter::new(Vec::new()))
        .with_util_log(UtilizationLog::create(&path).unwrap());
    driver.run(trace, std::future::pending()).await.unwrap();
    drop(driver);

    let log = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        log,
        "2013-03-01 00:00:27 export 1 0 0\n\
         2013-03-01 00:00:30 url 1 0 0\n"
    );
}

#[tokio::test]
async fn placement_failure_surfaces_from_the_loop() {
    let config = SchedulerConfig {
        floor: 1,
        warmup_grace_seconds: 0,
        ..Default::default()
    };
    let trace = b"2013-03-01 00:00:00 a export 1\n\
                  2013-03-01 00:00:10 b export 1\n" as &[u8];
    let mut driver = driver(config);
    let err = driver
        .run(trace, std::future::pending())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PlacementFailed { uid, .. } if uid == "b"));
}
