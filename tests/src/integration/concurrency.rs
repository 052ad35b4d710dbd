//! # Concurrency
//!
//! The reaper, resets and terminal requests all contend for the one
//! session slot and the one barrier. After any interleaving the barrier is
//! either locked or held open by a live session.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use kc_03_disposal::{DisposalApi, DisposalError, PhaseName, ReapOutcome, SessionReaper};
    use shared_types::LockState;

    use crate::fixtures::DeviceKiosk;

    const KIM: &str = "DF 79 1A 82";
    const LEE: &str = "04 A2 19";

    fn assert_safe(kiosk: &DeviceKiosk) {
        let now = kiosk.ctx.now();
        assert!(kiosk.ctx.interlock().is_safe(now), "barrier open without a session");
    }

    #[tokio::test]
    async fn test_reaper_closes_abandoned_session() {
        let kiosk = DeviceKiosk::new();
        let reaper = SessionReaper::new(kiosk.ctx.clone());
        kiosk.scale_reads("8.00");
        kiosk.machine.authenticate(DeviceKiosk::uid(KIM)).await.unwrap();

        kiosk.clock.advance(Duration::minutes(31));
        assert_eq!(reaper.tick(), ReapOutcome::Reaped);
        assert_eq!(kiosk.lock_state(), LockState::Locked);
        assert_safe(&kiosk);

        let err = kiosk.machine.confirm(DeviceKiosk::uid(KIM)).await.unwrap_err();
        assert_eq!(err, DisposalError::StaleOrMissingSession);

        kiosk.scale_reads("8.00");
        kiosk.machine.authenticate(DeviceKiosk::uid(KIM)).await.unwrap();
        assert_eq!(kiosk.lock_state(), LockState::Unlocked);
    }

    #[tokio::test]
    async fn test_reaper_spares_the_next_user() {
        let kiosk = DeviceKiosk::new();
        kiosk.register(LEE, "Lee", "Acme", 8414);
        let reaper = SessionReaper::new(kiosk.ctx.clone());

        kiosk.scale_reads("8.00");
        kiosk.machine.authenticate(DeviceKiosk::uid(KIM)).await.unwrap();
        let stale = reaper.scan().unwrap();

        kiosk.machine.reset().await;
        kiosk.scale_reads("9.00");
        kiosk.machine.authenticate(DeviceKiosk::uid(LEE)).await.unwrap();

        let later = kiosk.ctx.now() + Duration::minutes(45);
        assert_eq!(reaper.reap(&stale, later), ReapOutcome::Replaced);

        let status = kiosk.ctx.status();
        assert_eq!(status.lock, LockState::Unlocked);
        assert_eq!(status.session.unwrap().uid, DeviceKiosk::uid(LEE));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_authenticates_admit_one() {
        let kiosk = Arc::new(DeviceKiosk::new());
        for _ in 0..8 {
            kiosk.scale_reads("15.00");
        }

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let machine = kiosk.machine.clone();
                tokio::spawn(async move { machine.authenticate(DeviceKiosk::uid(KIM)).await })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(DisposalError::AlreadyActive { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(admitted, 1);
        assert_eq!(kiosk.lock_state(), LockState::Unlocked);
        assert_eq!(kiosk.ctx.status().phase, PhaseName::Disposing);
        assert_safe(&kiosk);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reset_from_another_task_ends_session() {
        let kiosk = Arc::new(DeviceKiosk::new());
        kiosk.scale_reads("30.00");
        kiosk.machine.authenticate(DeviceKiosk::uid(KIM)).await.unwrap();
        kiosk.machine.confirm(DeviceKiosk::uid(KIM)).await.unwrap();

        let machine = kiosk.machine.clone();
        let outcome = tokio::spawn(async move { machine.reset().await })
            .await
            .unwrap();
        assert!(outcome.cleared);

        kiosk.scale_reads("31.00");
        let err = kiosk.machine.finalize().await.unwrap_err();
        assert_eq!(err, DisposalError::StaleOrMissingSession);
        assert_eq!(kiosk.total(8414), Some("40.00".parse().unwrap()));
        assert_eq!(kiosk.lock_state(), LockState::Locked);
    }

    #[tokio::test]
    async fn test_barrier_safe_across_a_busy_day() {
        let kiosk = DeviceKiosk::new();
        kiosk.register(LEE, "Lee", "Acme", 8414);
        let reaper = SessionReaper::new(kiosk.ctx.clone());
        assert_safe(&kiosk);

        // Kim disposes normally.
        kiosk.scale_reads("10.00");
        kiosk.machine.authenticate(DeviceKiosk::uid(KIM)).await.unwrap();
        assert_safe(&kiosk);
        kiosk.machine.confirm(DeviceKiosk::uid(KIM)).await.unwrap();
        kiosk.scale_reads("11.00");
        kiosk.machine.finalize().await.unwrap();
        assert_safe(&kiosk);

        // Lee walks away mid-session.
        kiosk.scale_reads("11.00");
        kiosk.machine.authenticate(DeviceKiosk::uid(LEE)).await.unwrap();
        assert!(kiosk
            .machine
            .authenticate(DeviceKiosk::uid(KIM))
            .await
            .is_err());
        assert_safe(&kiosk);

        kiosk.clock.advance(Duration::minutes(31));
        assert_eq!(reaper.tick(), ReapOutcome::Reaped);
        assert_safe(&kiosk);

        // Kim again, scale drops out on the way out.
        kiosk.scale_reads("11.00");
        kiosk.machine.authenticate(DeviceKiosk::uid(KIM)).await.unwrap();
        kiosk.machine.confirm(DeviceKiosk::uid(KIM)).await.unwrap();
        assert!(kiosk.machine.finalize().await.is_err());
        assert_safe(&kiosk);
        assert_eq!(kiosk.lock_state(), LockState::Locked);

        assert_eq!(kiosk.total(8414), Some("41.00".parse().unwrap()));
        assert!(kiosk
            .actuator
            .writes()
            .ends_with(&[LockState::Locked]));
    }
}
