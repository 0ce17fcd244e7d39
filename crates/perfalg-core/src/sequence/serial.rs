use perfalg_model::Repetition;
use tokio::time::Instant;

use super::{Outcome, Sequence, pacer::Pacer};
use crate::error::ExecError;

impl Sequence {
    /// Children in declared order, pass after pass, until the repetition policy is met.
    ///
    /// A run-until-exhausted sequence absorbs [`ExecError::Exhausted`] and stops after the
    /// pass in progress. Any other sequence stops at once and passes it upward.
    pub(super) async fn run_serial(&mut self, child_report: bool) -> Result<Outcome, ExecError> {
        let mut out = Outcome::default();
        let mut pacer = self.rate.map(Pacer::new);
        let until_exhausted = self.repetition.is_until_exhausted();
        let started = Instant::now();
        let mut passes: u64 = 0;
        self.completed_passes = 0;

        loop {
            if let Repetition::Count(n) = self.repetition
                && passes >= u64::from(n)
            {
                break;
            }

            for child in &mut self.children {
                if let Some(p) = pacer.as_mut() {
                    p.wait().await;
                }
                match child.run(child_report).await {
                    Ok(o) => out.absorb(&o),
                    Err(ExecError::Exhausted) if until_exhausted => out.exhausted = true,
                    Err(e) => return Err(e),
                }
            }

            passes += 1;
            self.completed_passes = passes;

            match self.repetition {
                Repetition::UntilExhausted if out.exhausted => break,
                Repetition::For(limit) if started.elapsed() >= limit => break,
                _ => {}
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use perfalg_model::Rate;

    use crate::{
        error::{ExecError, TaskError},
        sequence::Sequence,
        testing::{Probe, Journal, run_data, task},
    };

    use super::*;

    #[tokio::test]
    async fn count_interleaves_children() {
        let run = run_data(&[]);
        let journal = Journal::default();
        let mut seq = Sequence::serial(run.clone());
        seq.push(task(&run, Probe::new("A", &journal)));
        seq.push(task(&run, Probe::new("B", &journal)));
        seq.set_repetition(Repetition::Count(5));

        let out = seq.run(false).await.unwrap();
        assert_eq!(journal.names(), "A,B,A,B,A,B,A,B,A,B");
        assert_eq!(out.count, 10);
        assert_eq!(seq.completed_passes(), 5);
    }

    #[tokio::test]
    async fn zero_count_runs_nothing() {
        let run = run_data(&[]);
        let journal = Journal::default();
        let mut seq = Sequence::serial(run.clone());
        seq.push(task(&run, Probe::new("A", &journal)));
        seq.set_repetition(Repetition::Count(0));

        assert_eq!(seq.run(false).await.unwrap(), Outcome::default());
        assert!(journal.names().is_empty());
    }

    #[tokio::test]
    async fn until_exhausted_stops_after_signal() {
        let run = run_data(&[]);
        let journal = Journal::default();
        let mut seq = Sequence::serial(run.clone());
        seq.push(task(&run, Probe::new("Read", &journal).exhaust_after(6)));
        seq.set_repetition(Repetition::UntilExhausted);

        let out = seq.run(false).await.unwrap();
        assert!(out.exhausted);
        assert_eq!(out.count, 6);
        assert_eq!(journal.len(), 6);
    }

    #[tokio::test]
    async fn exhaustion_finishes_the_current_pass() {
        let run = run_data(&[]);
        let journal = Journal::default();
        let mut seq = Sequence::serial(run.clone());
        seq.push(task(&run, Probe::new("Read", &journal).exhaust_after(2)));
        seq.push(task(&run, Probe::new("After", &journal)));
        seq.set_repetition(Repetition::UntilExhausted);

        seq.run(false).await.unwrap();
        assert_eq!(journal.names(), "Read,After,Read,After,After");
    }

    #[tokio::test]
    async fn exhaustion_escapes_counted_sequence() {
        let run = run_data(&[]);
        let journal = Journal::default();
        let mut seq = Sequence::serial(run.clone());
        seq.push(task(&run, Probe::new("Read", &journal).exhaust_after(1)));
        seq.push(task(&run, Probe::new("After", &journal)));
        seq.set_repetition(Repetition::Count(3));

        let err = seq.run(false).await.unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(journal.names(), "Read,After");
    }

    #[tokio::test]
    async fn nested_exhaustion_stops_outer_loop() {
        let run = run_data(&[]);
        let journal = Journal::default();

        let mut inner = Sequence::serial(run.clone());
        inner.push(task(&run, Probe::new("Read", &journal).exhaust_after(3)));
        inner.set_repetition(Repetition::UntilExhausted);

        let mut outer = Sequence::serial(run.clone());
        outer.push(inner);
        outer.push(task(&run, Probe::new("Tail", &journal)));
        outer.set_repetition(Repetition::UntilExhausted);

        let out = outer.run(false).await.unwrap();
        assert!(out.exhausted);
        assert_eq!(journal.names(), "Read,Read,Read,Tail");
        assert_eq!(outer.completed_passes(), 1);
    }

    #[tokio::test]
    async fn reset_keeps_outer_loop_going() {
        let run = run_data(&[]);
        let journal = Journal::default();
        let read = Probe::new("Read", &journal).exhaust_after(2);
        let source = read.source();

        let mut inner = Sequence::serial(run.clone());
        inner.push(task(&run, read));
        inner.set_repetition(Repetition::UntilExhausted);

        let mut outer = Sequence::serial(run.clone());
        outer.push(inner);
        outer.push(task(&run, Probe::new("Reset", &journal).resetting(source)));
        outer.set_repetition(Repetition::Count(2));

        let out = outer.run(false).await.unwrap();
        assert!(!out.exhausted);
        assert!(out.reset);
        assert_eq!(journal.names(), "Read,Read,Reset,Read,Read,Reset");
    }

    #[tokio::test]
    async fn duration_completes_full_passes() {
        let run = run_data(&[]);
        let journal = Journal::default();
        let mut seq = Sequence::serial(run.clone());
        seq.push(task(&run, Probe::new("A", &journal).delay(Duration::from_millis(20))));
        seq.push(task(&run, Probe::new("B", &journal)));
        seq.set_repetition(Repetition::For(Duration::from_millis(50)));

        let started = Instant::now();
        seq.run(false).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(journal.len() % 2, 0);
        assert_eq!(journal.len() as u64, seq.completed_passes() * 2);
    }

    #[tokio::test]
    async fn rate_paces_starts() {
        let run = run_data(&[]);
        let journal = Journal::default();
        let mut seq = Sequence::serial(run.clone());
        seq.push(task(&run, Probe::new("A", &journal)));
        seq.set_repetition(Repetition::Count(10));
        seq.set_rate(Rate::per_sec(5));

        let started = Instant::now();
        seq.run(false).await.unwrap();
        let elapsed = started.elapsed();
        assert_eq!(journal.len(), 10);
        assert!(elapsed >= Duration::from_millis(1780), "{elapsed:?}");
        assert!(elapsed <= Duration::from_millis(2200), "{elapsed:?}");
    }

    #[tokio::test]
    async fn failure_is_wrapped_with_task_and_depth() {
        let run = run_data(&[]);
        let journal = Journal::default();
        let mut seq = Sequence::serial(run.clone());
        seq.push(task(&run, Probe::new("Boom", &journal).fail_after(0)));
        seq.push(task(&run, Probe::new("Never", &journal)));

        match seq.run(false).await.unwrap_err() {
            ExecError::Task {
                task, depth, source, ..
            } => {
                assert_eq!(task, "Boom");
                assert_eq!(depth, 1);
                assert!(matches!(source, TaskError::Failed { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(journal.names().is_empty());
    }

    #[tokio::test]
    async fn disabled_counting_is_excluded_from_count() {
        let run = run_data(&[]);
        let journal = Journal::default();
        let mut seq = Sequence::serial(run.clone());
        let mut node = task(&run, Probe::new("A", &journal).counting(3));
        node.set_disable_counting(true);
        seq.push(node);
        seq.push(task(&run, Probe::new("B", &journal).counting(2)));

        let out = seq.run(false).await.unwrap();
        assert_eq!(out.count, 2);
        assert_eq!(out.raw_count, 5);
    }

    #[tokio::test]
    async fn reporting_records_sequence_and_children() {
        let run = run_data(&[]);
        let journal = Journal::default();
        let mut seq = Sequence::serial(run.clone());
        seq.push(task(&run, Probe::new("A", &journal)));
        seq.set_repetition(Repetition::Count(2));
        seq.run(true).await.unwrap();

        let report = run.stats().by_name();
        assert_eq!(report.row("A").unwrap().runs, 2);
        assert_eq!(report.row("Seq_2").unwrap().count, 2);

        run.stats().clear();
        seq.set_no_child_report();
        seq.run(true).await.unwrap();
        let report = run.stats().by_name();
        assert!(report.row("A").is_none());
        assert_eq!(report.row("Seq_2").unwrap().runs, 1);
    }
}
