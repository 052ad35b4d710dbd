//! # Disposal Flows
//!
//! ```text
//! card ──→ read_tag ──→ authenticate ──→ confirm ──→ finalize
//!                         │ scale × 3                  │ scale × 3
//!                         └ unlock                     ├ ledger file
//!                                                      ├ bus event
//!                                                      └ lock
//! ```

#[cfg(test)]
mod tests {
    use kc_03_disposal::{DisposalApi, DisposalError, PhaseName};
    use shared_types::{LockState, Weight};

    use crate::fixtures::DeviceKiosk;

    const KIM: &str = "DF 79 1A 82";

    fn kg(hundredths: i64) -> Weight {
        Weight::from_hundredths(hundredths)
    }

    #[tokio::test]
    async fn test_full_disposal_books_and_broadcasts() {
        let kiosk = DeviceKiosk::new();
        let mut events = kiosk.bus.subscribe();

        kiosk.card.present(KIM);
        let uid = kiosk.machine.read_tag().await.unwrap();
        kiosk.scale_reads("50.00");
        let auth = kiosk.machine.authenticate(uid.clone()).await.unwrap();
        assert_eq!(auth.name, "Kim");
        assert_eq!(auth.baseline_weight, kg(5000));
        assert_eq!(kiosk.lock_state(), LockState::Unlocked);

        let confirm = kiosk.machine.confirm(uid).await.unwrap();
        assert!(confirm.confirmed);
        kiosk.card.lift();

        kiosk.scale_reads("52.70");
        let receipt = kiosk.machine.finalize().await.unwrap();
        assert_eq!(receipt.delta, kg(270));
        assert_eq!(receipt.company_total, kg(4270));
        assert_eq!(receipt.message, "Kim disposed 2.70 kg");

        assert_eq!(kiosk.lock_state(), LockState::Locked);
        assert_eq!(kiosk.actuator.last(), Some(LockState::Locked));
        assert_eq!(kiosk.total(8414), Some(kg(4270)));
        assert_eq!(kiosk.ctx.status().phase, PhaseName::Idle);

        let event = events.try_recv().unwrap().unwrap();
        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].asgn_cd, "8414");
        assert_eq!(event.records[0].company, "Acme");
        assert_eq!(event.records[0].weight, kg(270));

        let payload: serde_json::Value =
            serde_json::from_slice(&event.to_payload().unwrap()).unwrap();
        assert_eq!(
            payload,
            serde_json::json!([{ "asgn_cd": "8414", "company": "Acme", "weight": 2.7 }])
        );
    }

    #[tokio::test]
    async fn test_noisy_indicator_lines_are_averaged() {
        let kiosk = DeviceKiosk::new();
        kiosk.scale_lines(&["\u{2}ST,GS,  12.30kg", "OL,GS, ------ kg", "ST,GS,  12.50 kg"]);

        let auth = kiosk
            .machine
            .authenticate(DeviceKiosk::uid(KIM))
            .await
            .unwrap();

        assert_eq!(auth.baseline_weight, kg(1240));
        assert_eq!(kiosk.serial.open_handles(), 0);
    }

    #[tokio::test]
    async fn test_negative_reading_clamps_to_zero() {
        let kiosk = DeviceKiosk::new();
        kiosk.scale_reads("1.00");
        kiosk
            .machine
            .authenticate(DeviceKiosk::uid(KIM))
            .await
            .unwrap();
        kiosk.machine.confirm(DeviceKiosk::uid(KIM)).await.unwrap();

        kiosk.scale_lines(&["ST,GS, - 0.10 kg", "ST,GS, -0.10 kg", "ST,GS,  0.00 kg"]);
        let receipt = kiosk.machine.finalize().await.unwrap();

        assert_eq!(receipt.delta, kg(-100));
        assert_eq!(kiosk.total(8414), Some(kg(3900)));
    }

    #[tokio::test]
    async fn test_silent_scale_keeps_kiosk_locked() {
        let kiosk = DeviceKiosk::new();

        let err = kiosk
            .machine
            .authenticate(DeviceKiosk::uid(KIM))
            .await
            .unwrap_err();

        assert_eq!(err, DisposalError::NoValidSample { attempts: 3 });
        assert_eq!(kiosk.lock_state(), LockState::Locked);
        assert!(kiosk.ctx.status().session.is_none());
        assert_eq!(kiosk.serial.open_handles(), 0);
    }

    #[tokio::test]
    async fn test_unregistered_card_never_touches_scale() {
        let kiosk = DeviceKiosk::new();
        kiosk.card.present("00 11 22 33");

        let uid = kiosk.machine.read_tag().await.unwrap();
        let err = kiosk.machine.authenticate(uid).await.unwrap_err();

        assert!(matches!(err, DisposalError::UserNotFound { .. }));
        assert_eq!(kiosk.serial.opens(), 0);
        assert!(kiosk.actuator.writes().iter().all(|s| *s == LockState::Locked));
    }

    #[tokio::test]
    async fn test_empty_reader_reports_no_tag() {
        let kiosk = DeviceKiosk::new();
        let err = kiosk.machine.read_tag().await.unwrap_err();
        assert_eq!(err, DisposalError::TagNotPresented);
    }

    #[tokio::test]
    async fn test_ledger_survives_restart() {
        let kiosk = DeviceKiosk::new();
        kiosk.scale_reads("10.00");
        kiosk.machine.authenticate(DeviceKiosk::uid(KIM)).await.unwrap();
        kiosk.machine.confirm(DeviceKiosk::uid(KIM)).await.unwrap();
        kiosk.scale_reads("13.25");
        kiosk.machine.finalize().await.unwrap();

        let kiosk = kiosk.reopen();
        assert_eq!(kiosk.total(8414), Some(kg(4325)));
        assert_eq!(kiosk.lock_state(), LockState::Locked);

        // Users came back from the file too.
        kiosk.scale_reads("5.00");
        let auth = kiosk.machine.authenticate(DeviceKiosk::uid(KIM)).await.unwrap();
        assert_eq!(auth.company, "Acme");
    }

    #[tokio::test]
    async fn test_event_lists_every_company_code() {
        let kiosk = DeviceKiosk::new();
        kiosk.register("04 A2 19", "Lee", "Acme", 7);
        kiosk.book(7, "Acme", "1.00");
        let mut events = kiosk.bus.subscribe_company("Acme");

        kiosk.scale_reads("20.00");
        kiosk.machine.authenticate(DeviceKiosk::uid(KIM)).await.unwrap();
        kiosk.machine.confirm(DeviceKiosk::uid(KIM)).await.unwrap();
        kiosk.scale_reads("21.00");
        kiosk.machine.finalize().await.unwrap();

        let event = events.try_recv().unwrap().unwrap();
        let codes: Vec<_> = event.records.iter().map(|r| r.asgn_cd.as_str()).collect();
        assert_eq!(codes, vec!["0007", "8414"]);

        // Only the disposing user's row moves.
        assert_eq!(kiosk.total(7), Some(kg(100)));
        assert_eq!(kiosk.total(8414), Some(kg(4100)));
    }

    #[tokio::test]
    async fn test_missing_aggregate_row_fails_and_locks() {
        let kiosk = DeviceKiosk::new();
        kiosk.register("04 A2 19", "Lee", "Beta", 12);

        kiosk.scale_reads("3.00");
        kiosk.machine.authenticate(DeviceKiosk::uid("04 A2 19")).await.unwrap();
        kiosk.machine.confirm(DeviceKiosk::uid("04 A2 19")).await.unwrap();
        kiosk.scale_reads("4.00");

        let err = kiosk.machine.finalize().await.unwrap_err();
        assert!(matches!(err, DisposalError::CompanyNotFound { .. }));
        assert_eq!(kiosk.lock_state(), LockState::Locked);
        assert!(kiosk.ctx.status().session.is_none());
    }
}
