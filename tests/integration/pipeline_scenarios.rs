//! End-to-end pipeline runs against scripted oracles.

use super::test_utils::{business, ideas_for, ScriptedOracle};
use chrono::NaiveDate;
use contentcal::error::{ApiError, OracleError};
use contentcal::pipeline::{CalendarPipeline, CalendarRequest, ChunkPolicy};
use contentcal::schedule::{enumerate_posting_dates, DistributionPattern, PostingDate};
use contentcal::types::{BatchOutput, ContentPillar};
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn daily(start: NaiveDate, count: i64) -> CalendarRequest {
    CalendarRequest {
        start_date: start,
        end_date: start + chrono::Duration::days(count - 1),
        pattern: DistributionPattern::for_frequency(7).unwrap(),
        business: business(),
    }
}

fn pipeline(oracle: &Arc<ScriptedOracle>) -> CalendarPipeline {
    CalendarPipeline::new(oracle.clone(), ChunkPolicy::default()).unwrap()
}

#[tokio::test]
async fn test_three_weeks_mon_wed_fri_fits_one_batch() {
    let oracle = Arc::new(ScriptedOracle::size_limited(60));
    let request = CalendarRequest {
        start_date: date(2024, 1, 1),
        end_date: date(2024, 1, 21),
        pattern: DistributionPattern::from_names(["Monday", "Wednesday", "Friday"]).unwrap(),
        business: business(),
    };

    let calendar = pipeline(&oracle).run(&request).await.unwrap();

    assert_eq!(oracle.call_sizes(), vec![9]);
    assert_eq!(calendar.content_ideas.len(), 9);
    assert!(calendar
        .content_ideas
        .windows(2)
        .all(|w| w[0].date <= w[1].date));
    assert_eq!(calendar.content_ideas[0].date, date(2024, 1, 1));
    assert_eq!(calendar.content_ideas[8].date, date(2024, 1, 19));
}

#[tokio::test]
async fn test_failure_halves_then_ramps_back_up() {
    // Only the very first attempt fails.
    let oracle = Arc::new(ScriptedOracle::new(|call, batch| {
        if call == 0 {
            Err(OracleError::Timeout(std::time::Duration::from_secs(120)))
        } else {
            Ok(BatchOutput {
                pillars: vec![ContentPillar::Label(format!("pillar-{}", call))],
                ideas: ideas_for(batch),
            })
        }
    }));

    let calendar = pipeline(&oracle).run(&daily(date(2024, 1, 1), 70)).await.unwrap();

    let requested: Vec<usize> = oracle.calls().iter().map(|b| b.requested_size).collect();
    assert_eq!(requested, vec![30, 15, 20, 25, 30]);
    assert_eq!(oracle.call_sizes(), vec![30, 15, 20, 25, 10]);
    assert_eq!(calendar.content_ideas.len(), 70);
    // Pillars come from the first successful batch.
    assert_eq!(calendar.content_pillars, vec![ContentPillar::Label("pillar-1".to_string())]);
}

#[tokio::test]
async fn test_floor_failure_exhausts_and_returns_nothing() {
    let oracle = Arc::new(ScriptedOracle::size_limited(0));

    let err = pipeline(&oracle)
        .run(&daily(date(2024, 3, 1), 10))
        .await
        .unwrap_err();

    assert_eq!(oracle.call_sizes(), vec![10, 7]);
    match err {
        ApiError::PipelineExhausted {
            start_date,
            batch_size,
            succeeded_batches,
            ..
        } => {
            assert_eq!(start_date, date(2024, 3, 1));
            assert_eq!(batch_size, 7);
            assert_eq!(succeeded_batches, 0);
        }
        other => panic!("expected PipelineExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_truncated_tail_at_the_floor_gets_one_attempt() {
    // 70 daily dates: 30 and 35 succeed, leaving a 5-date tail sent under a
    // requested size of 40. A tail at or below the floor cannot shrink further.
    let oracle = Arc::new(ScriptedOracle::new(|call, batch| {
        if call == 2 {
            Err(OracleError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            })
        } else {
            Ok(BatchOutput {
                pillars: vec![],
                ideas: ideas_for(batch),
            })
        }
    }));

    let err = pipeline(&oracle)
        .run(&daily(date(2024, 1, 1), 70))
        .await
        .unwrap_err();

    let requested: Vec<usize> = oracle.calls().iter().map(|b| b.requested_size).collect();
    assert_eq!(requested, vec![30, 35, 40]);
    assert_eq!(oracle.call_sizes(), vec![30, 35, 5]);
    match err {
        ApiError::PipelineExhausted {
            start_date,
            batch_size,
            succeeded_batches,
            ..
        } => {
            assert_eq!(start_date, date(2024, 3, 6));
            assert_eq!(batch_size, 5);
            assert_eq!(succeeded_batches, 2);
        }
        other => panic!("expected PipelineExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_pattern_completes_without_oracle_calls() {
    let oracle = Arc::new(ScriptedOracle::size_limited(60));
    let request = CalendarRequest {
        pattern: DistributionPattern::empty(),
        ..daily(date(2024, 1, 1), 90)
    };

    let calendar = pipeline(&oracle).run(&request).await.unwrap();

    assert!(oracle.calls().is_empty());
    assert!(calendar.content_ideas.is_empty());
    assert!(calendar.content_pillars.is_empty());
}

#[tokio::test]
async fn test_late_exhaustion_discards_earlier_batches() {
    // Batches succeed until the tail, where everything fails.
    let oracle = Arc::new(ScriptedOracle::new(|_, batch| {
        if batch.first().map(|d| d.date()) >= Some(date(2024, 2, 20)) {
            Err(OracleError::MalformedBody("truncated".to_string()))
        } else {
            Ok(BatchOutput {
                pillars: vec![],
                ideas: ideas_for(batch),
            })
        }
    }));

    let err = pipeline(&oracle)
        .run(&daily(date(2024, 1, 1), 100))
        .await
        .unwrap_err();

    match err {
        ApiError::PipelineExhausted {
            succeeded_batches, ..
        } => assert!(succeeded_batches >= 1),
        other => panic!("expected PipelineExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_succeeded_batches_partition_the_dates() {
    // Fails every batch larger than 12, forcing several halvings.
    let oracle = Arc::new(ScriptedOracle::size_limited(12));
    let request = daily(date(2023, 11, 15), 120);
    let expected: Vec<PostingDate> =
        enumerate_posting_dates(request.start_date, request.end_date, &request.pattern).unwrap();

    let calendar = pipeline(&oracle).run(&request).await.unwrap();

    let covered: Vec<PostingDate> = oracle
        .calls()
        .into_iter()
        .filter(|b| b.len() <= 12)
        .flat_map(|b| b.dates)
        .collect();
    assert_eq!(covered, expected);

    let idea_dates: Vec<NaiveDate> = calendar.content_ideas.iter().map(|i| i.date).collect();
    let expected_dates: Vec<NaiveDate> = expected.iter().map(|d| d.date()).collect();
    assert_eq!(idea_dates, expected_dates);
}

#[tokio::test]
async fn test_retries_never_resend_a_larger_batch() {
    let oracle = Arc::new(ScriptedOracle::size_limited(9));
    pipeline(&oracle)
        .run(&daily(date(2024, 1, 1), 45))
        .await
        .unwrap();

    let calls = oracle.calls();
    for pair in calls.windows(2) {
        if pair[0].len() > 9 && pair[0].first() == pair[1].first() {
            assert!(pair[1].len() < pair[0].len());
        }
    }
}
