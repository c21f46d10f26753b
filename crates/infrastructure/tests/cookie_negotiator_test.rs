use quarry_dns_domain::{DomainError, MessageHeader, ResponseCode, HEADER_LEN};
use quarry_dns_infrastructure::dns::edns::{CookieNegotiator, CookieSecret, CookieStatus, OptRecord};
use quarry_dns_infrastructure::dns::parse_questions;
use std::net::IpAddr;

mod helpers;
use helpers::{append_opt_record, QueryBuilder, CLIENT_COOKIE};

const NOW: u32 = 1_750_000_000;

fn negotiator() -> CookieNegotiator {
    CookieNegotiator::new(CookieSecret::from_bytes(b"negotiator-test-secret"))
}

fn client_ip() -> IpAddr {
    "192.0.2.53".parse().unwrap()
}

/// Header and additional section of a built request.
fn split(datagram: &[u8]) -> (MessageHeader, Vec<u8>) {
    let header = MessageHeader::decode(datagram).unwrap();
    let (_, end) = parse_questions(datagram, header.question_count, HEADER_LEN).unwrap();
    (header, datagram[end..].to_vec())
}

fn run(datagram: &[u8]) -> (MessageHeader, Result<Option<OptRecord>, DomainError>) {
    let (mut header, additional) = split(datagram);
    let count = header.additional_count;
    let result = negotiator().process_at(&mut header, count, &additional, client_ip(), NOW);
    (header, result)
}

#[test]
fn test_no_additional_records_is_a_no_op() {
    let datagram = QueryBuilder::new().a_query("example.com").build();
    let (header, result) = run(&datagram);

    assert!(result.unwrap().is_none());
    assert_eq!(header, MessageHeader::decode(&datagram).unwrap());
}

#[test]
fn test_no_additional_records_ignores_trailing_bytes() {
    let mut datagram = QueryBuilder::new().a_query("example.com").build();
    datagram.extend_from_slice(&[0xFF; 7]);
    let (header, result) = run(&datagram);

    assert!(result.unwrap().is_none());
    assert_eq!(header.response_code(), ResponseCode::NoError);
}

#[test]
fn test_valid_client_cookie_gets_server_cookie() {
    let datagram = QueryBuilder::new()
        .a_query("example.com")
        .cookie(&CLIENT_COOKIE)
        .build();
    let (header, result) = run(&datagram);
    let opt = result.unwrap().unwrap();

    assert_eq!(header.response_code(), ResponseCode::NoError);
    assert_eq!(opt.cookie_status(), Some(CookieStatus::ClientOnly));

    let server = opt.response_cookie().unwrap();
    assert_eq!(server.version(), 1);
    assert_eq!(server.timestamp(), NOW);
    assert_eq!(
        negotiator()
            .secret()
            .verify(&CLIENT_COOKIE, server.as_bytes(), client_ip(), NOW + 10),
        CookieStatus::Valid
    );
}

#[test]
fn test_server_cookie_is_bound_to_client_address() {
    let datagram = QueryBuilder::new()
        .a_query("example.com")
        .cookie(&CLIENT_COOKIE)
        .build();
    let (_, result) = run(&datagram);
    let opt = result.unwrap().unwrap();
    let server = opt.response_cookie().unwrap();

    let other: IpAddr = "192.0.2.54".parse().unwrap();
    assert_eq!(
        negotiator()
            .secret()
            .verify(&CLIENT_COOKIE, server.as_bytes(), other, NOW),
        CookieStatus::Invalid
    );
}

#[test]
fn test_echoed_server_cookie_is_validated() {
    let issued = negotiator()
        .secret()
        .derive(&CLIENT_COOKIE, client_ip(), NOW - 60);
    let mut cookie = CLIENT_COOKIE.to_vec();
    cookie.extend_from_slice(issued.as_bytes());

    let datagram = QueryBuilder::new()
        .a_query("example.com")
        .cookie(&cookie)
        .build();
    let (header, result) = run(&datagram);
    let opt = result.unwrap().unwrap();

    assert_eq!(header.response_code(), ResponseCode::NoError);
    assert_eq!(opt.cookie_status(), Some(CookieStatus::Valid));
    assert_eq!(opt.response_cookie().unwrap().timestamp(), NOW);
}

#[test]
fn test_opt_without_cookie_sets_formerr() {
    let datagram = QueryBuilder::new()
        .a_query("example.com")
        .opt(&[(12, &[0, 0])])
        .build();
    let (header, result) = run(&datagram);
    let opt = result.unwrap().unwrap();

    assert_eq!(header.response_code(), ResponseCode::FormErr);
    assert!(opt.response_cookie().is_none());
}

#[test]
fn test_malformed_cookie_sets_formerr() {
    let datagram = QueryBuilder::new()
        .a_query("example.com")
        .cookie(&[1, 2, 3, 4, 5])
        .build();
    let (header, result) = run(&datagram);
    let opt = result.unwrap().unwrap();

    assert_eq!(header.response_code(), ResponseCode::FormErr);
    assert!(opt.has_form_err());
    assert!(opt.response_cookie().is_none());
}

#[test]
fn test_formerr_leaves_other_header_fields_alone() {
    let datagram = QueryBuilder::new()
        .id(0xBEEF)
        .a_query("example.com")
        .opt(&[])
        .build();
    let (header, _) = run(&datagram);

    let mut expected = MessageHeader::decode(&datagram).unwrap();
    expected.set_response_code(ResponseCode::FormErr);
    assert_eq!(header, expected);
}

#[test]
fn test_multiple_additional_records_fail() {
    let mut additional = Vec::new();
    append_opt_record(&mut additional, 4096, &[(10, &CLIENT_COOKIE)]);
    append_opt_record(&mut additional, 4096, &[(10, &CLIENT_COOKIE)]);
    let datagram = QueryBuilder::new()
        .a_query("example.com")
        .raw_additional(&additional, 2)
        .build();

    let (header, result) = run(&datagram);

    assert_eq!(result.unwrap_err(), DomainError::MultipleOptRecords(2));
    assert_eq!(header.response_code(), ResponseCode::NoError);
}

#[test]
fn test_additional_record_that_is_not_opt_fails() {
    let mut additional = vec![0x00, 0x00, 0x01, 0x00, 0x01, 0, 0, 0, 60, 0x00, 0x04];
    additional.extend_from_slice(&[192, 0, 2, 1]);
    let datagram = QueryBuilder::new()
        .a_query("example.com")
        .raw_additional(&additional, 1)
        .build();

    let (_, result) = run(&datagram);
    assert!(matches!(result, Err(DomainError::InvalidOptRecord(_))));
}

#[test]
fn test_missing_additional_record_is_truncated() {
    let datagram = QueryBuilder::new()
        .a_query("example.com")
        .additional_count(1)
        .build();

    let (_, result) = run(&datagram);
    assert!(matches!(result, Err(DomainError::TruncatedMessage { .. })));
}

#[test]
fn test_generated_negotiators_use_distinct_secrets() {
    let a = CookieNegotiator::generate().unwrap();
    let b = CookieNegotiator::generate().unwrap();
    let cookie = a.secret().derive(&CLIENT_COOKIE, client_ip(), NOW);
    assert_eq!(
        b.secret()
            .verify(&CLIENT_COOKIE, cookie.as_bytes(), client_ip(), NOW),
        CookieStatus::Invalid
    );
}
