use quarry_dns_domain::RecordType;
use std::str::FromStr;

#[test]
fn test_known_codes_map_both_ways() {
    let cases = [
        (1, RecordType::A),
        (2, RecordType::NS),
        (5, RecordType::CNAME),
        (12, RecordType::PTR),
        (15, RecordType::MX),
        (16, RecordType::TXT),
        (28, RecordType::AAAA),
        (33, RecordType::SRV),
        (41, RecordType::OPT),
        (65, RecordType::HTTPS),
        (255, RecordType::ANY),
        (257, RecordType::CAA),
    ];

    for (code, record_type) in cases {
        assert_eq!(RecordType::from_u16(code), record_type);
        assert_eq!(record_type.to_u16(), code);
        assert!(record_type.is_known());
    }
}

#[test]
fn test_unknown_code_is_kept() {
    let record_type = RecordType::from(65_400);
    assert_eq!(record_type, RecordType::Unknown(65_400));
    assert_eq!(record_type.to_u16(), 65_400);
    assert!(!record_type.is_known());
}

#[test]
fn test_display() {
    assert_eq!(RecordType::AAAA.to_string(), "AAAA");
    assert_eq!(RecordType::Unknown(999).to_string(), "TYPE999");
}

#[test]
fn test_from_str() {
    assert_eq!(RecordType::from_str("mx").unwrap(), RecordType::MX);
    assert_eq!(RecordType::from_str("NSEC3PARAM").unwrap(), RecordType::NSEC3PARAM);
    assert_eq!(RecordType::from_str("TYPE999").unwrap(), RecordType::Unknown(999));
    assert_eq!(RecordType::from_str("type1").unwrap(), RecordType::A);
    assert!(RecordType::from_str("BOGUS").is_err());
    assert!(RecordType::from_str("TYPEx").is_err());
}
