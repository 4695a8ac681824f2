//! Unit tests for the identifier newtypes

use core_kernel::{ApplicantProfileId, ApplicationId, LoanTypeId, StatusId};

mod application_id_tests {
    use super::*;

    #[test]
    fn test_value_round_trip() {
        let id = ApplicationId::new(17);
        assert_eq!(id.value(), 17);
        assert_eq!(i64::from(id), 17);
        assert_eq!(ApplicationId::from(17), id);
    }

    #[test]
    fn test_display_is_raw_number() {
        assert_eq!(ApplicationId::new(250).to_string(), "250");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id: ApplicationId = " 9 ".parse().unwrap();
        assert_eq!(id, ApplicationId::new(9));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<ApplicationId>().is_err());
        assert!("".parse::<ApplicationId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&ApplicationId::new(5)).unwrap();
        assert_eq!(json, "5");
        let back: ApplicationId = serde_json::from_str("5").unwrap();
        assert_eq!(back, ApplicationId::new(5));
    }

    #[test]
    fn test_ordering_follows_value() {
        let mut ids = vec![ApplicationId::new(3), ApplicationId::new(1), ApplicationId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![ApplicationId::new(1), ApplicationId::new(2), ApplicationId::new(3)]);
    }
}

mod label_tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(ApplicationId::label(), "application");
        assert_eq!(LoanTypeId::label(), "loan type");
        assert_eq!(StatusId::label(), "status");
        assert_eq!(ApplicantProfileId::label(), "applicant");
    }
}

mod const_tests {
    use super::*;

    const PENDING: StatusId = StatusId::new(1);

    #[test]
    fn test_const_construction() {
        assert_eq!(PENDING.value(), 1);
    }
}
