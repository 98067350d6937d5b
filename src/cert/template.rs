//! Certificate template construction.
//!
//! Pure functions translating per-role options into declarative
//! [`rcgen::CertificateParams`]: subject and issuer naming, validity-window
//! resolution, serial assignment, and the extension set each role carries.
//! No key generation, signing, or filesystem access happens here.

use crate::config::{CaOptions, ServerOptions, SubjectOptions, UserOptions, ValidityOptions};
use crate::error::{CertmintError, Result};
use crate::hosts::LocalHost;
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyUsagePurpose, SanType, SerialNumber,
};
use std::net::{IpAddr, Ipv4Addr};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime};

const DEFAULT_COUNTRY: &str = "US";

/// Build the ordered subject distinguished name from typed options.
///
/// Attribute order is C, O, OU, CN, L, ST. The country defaults to `US`;
/// every other absent field is omitted.
pub fn subject_name(options: &SubjectOptions) -> DistinguishedName {
    let mut dn = DistinguishedName::new();

    dn.push(
        DnType::CountryName,
        options.country.as_deref().unwrap_or(DEFAULT_COUNTRY),
    );
    for org in &options.organizations {
        dn.push(DnType::OrganizationName, org.as_str());
    }
    for unit in &options.organizational_units {
        dn.push(DnType::OrganizationalUnitName, unit.as_str());
    }
    if let Some(cn) = &options.common_name {
        dn.push(DnType::CommonName, cn.as_str());
    }
    if let Some(locality) = &options.locality {
        dn.push(DnType::LocalityName, locality.as_str());
    }
    if let Some(state) = &options.state {
        dn.push(DnType::StateOrProvinceName, state.as_str());
    }

    dn
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (`2030-01-01T00:00:00Z`), a local date-time without an
/// offset (assumed UTC), or a bare date.
pub fn parse_datetime(value: &str) -> Result<OffsetDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(parsed);
    }
    if let Ok(parsed) = PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Ok(parsed.assume_utc());
    }
    if let Ok(parsed) = Date::parse(value, format_description!("[year]-[month]-[day]")) {
        return Ok(parsed.midnight().assume_utc());
    }

    Err(CertmintError::ParseError(format!(
        "Invalid ISO-8601 date: {value}"
    )))
}

/// Resolve the validity window for a certificate.
///
/// Starts from the role-agnostic default (not expired: `now - 1 day` through
/// `now + 5 years`; expired: `now - 5 years` through `now - 1 day`), then
/// applies any explicit bound unconditionally.
///
/// Fails with [`CertmintError::ValidityRangeError`] when both explicit bounds are
/// given and `valid_to` precedes `valid_from`. Callers invoke this before any
/// key generation or filesystem write.
pub fn resolve_validity(options: &ValidityOptions) -> Result<(OffsetDateTime, OffsetDateTime)> {
    if let (Some(valid_from), Some(valid_to)) = (&options.valid_from, &options.valid_to) {
        if parse_datetime(valid_to)? < parse_datetime(valid_from)? {
            return Err(CertmintError::ValidityRangeError {
                valid_from: valid_from.clone(),
                valid_to: valid_to.clone(),
            });
        }
    }

    let now = OffsetDateTime::now_utc();
    let (mut not_before, mut not_after) = if options.expired {
        (now - Duration::days(5 * 365), now - Duration::days(1))
    } else {
        (now - Duration::days(1), now + Duration::days(5 * 365))
    };

    if let Some(valid_from) = &options.valid_from {
        not_before = parse_datetime(valid_from)?;
    }
    if let Some(valid_to) = &options.valid_to {
        not_after = parse_datetime(valid_to)?;
    }

    Ok((not_before, not_after))
}

/// Whether a certificate should be treated as expired: either the flag is
/// set, or an explicit valid-to bound lies in the past. The result selects
/// both the validity window and the `expired` sub-path in the store.
pub fn effective_expired(options: &ValidityOptions) -> Result<bool> {
    if options.expired {
        return Ok(true);
    }
    match &options.valid_to {
        Some(valid_to) => Ok(parse_datetime(valid_to)? < OffsetDateTime::now_utc()),
        None => Ok(false),
    }
}

/// Certificate serial derived from the current time in milliseconds since
/// the Unix epoch: monotonically increasing and unique within an issuing
/// run.
pub fn timestamp_serial() -> SerialNumber {
    SerialNumber::from(chrono::Utc::now().timestamp_millis() as u64)
}

fn base_params(
    subject: &SubjectOptions,
    validity: &ValidityOptions,
) -> Result<CertificateParams> {
    let (not_before, not_after) = resolve_validity(validity)?;

    let mut params = CertificateParams::default();
    params.distinguished_name = subject_name(subject);
    params.not_before = not_before;
    params.not_after = not_after;
    params.serial_number = Some(timestamp_serial());
    Ok(params)
}

/// Build the template for a root or intermediate CA certificate.
///
/// Both carry `basicConstraints{cA}`, certificate-signing key usage, and a
/// subject key identifier. With `has_parent` set (the intermediate case) the
/// template additionally requests an authority key identifier bound to the
/// issuer's subject key identifier, plus the serverAuth extended key usage.
pub fn ca_params(options: &CaOptions, has_parent: bool) -> Result<CertificateParams> {
    let mut params = base_params(&options.subject, &options.validity)?;

    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::CrlSign,
    ];

    if has_parent {
        params.use_authority_key_identifier_extension = true;
        params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    }

    Ok(params)
}

/// Build the template for a server certificate.
///
/// The subject alternative names combine the localhost block (when
/// `localhost` data is supplied: the host DNS name, `localhost`, the loopback
/// address, and every non-loopback IPv4 bound to the host) with the
/// caller-supplied DNS and IP names. The extension is omitted entirely when
/// the combined list is empty.
pub fn server_params(
    options: &ServerOptions,
    localhost: Option<&LocalHost>,
) -> Result<CertificateParams> {
    let mut params = base_params(&options.subject, &options.validity)?;

    params.is_ca = IsCa::ExplicitNoCa;
    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::ContentCommitment,
        KeyUsagePurpose::KeyEncipherment,
        KeyUsagePurpose::DataEncipherment,
    ];
    params.extended_key_usages = vec![
        ExtendedKeyUsagePurpose::ServerAuth,
        ExtendedKeyUsagePurpose::ClientAuth,
        ExtendedKeyUsagePurpose::EmailProtection,
    ];
    params.use_authority_key_identifier_extension = true;

    let mut alt_names = Vec::new();
    if let Some(host) = localhost {
        alt_names.push(SanType::DnsName(host.dns_name.clone().try_into()?));
        alt_names.push(SanType::DnsName("localhost".to_string().try_into()?));
        alt_names.push(SanType::IpAddress(IpAddr::V4(Ipv4Addr::LOCALHOST)));
        for addr in &host.addresses {
            alt_names.push(SanType::IpAddress(IpAddr::V4(*addr)));
        }
    }
    for name in &options.subject_alt_dns_names {
        alt_names.push(SanType::DnsName(name.clone().try_into()?));
    }
    for name in &options.subject_alt_ip_names {
        let addr: IpAddr = name.parse().map_err(|_| {
            CertmintError::ParseError(format!("Invalid IP subject alternative name: {name}"))
        })?;
        alt_names.push(SanType::IpAddress(addr));
    }
    params.subject_alt_names = alt_names;

    Ok(params)
}

/// Build the template for a user certificate.
///
/// Same shape as a server certificate minus the content-commitment and
/// data-encipherment key usages; subject alternative names come only from
/// the caller-supplied RFC 822 (email) names.
pub fn user_params(options: &UserOptions) -> Result<CertificateParams> {
    let mut params = base_params(&options.subject, &options.validity)?;

    params.is_ca = IsCa::ExplicitNoCa;
    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
    ];
    params.extended_key_usages = vec![
        ExtendedKeyUsagePurpose::ServerAuth,
        ExtendedKeyUsagePurpose::ClientAuth,
        ExtendedKeyUsagePurpose::EmailProtection,
    ];
    params.use_authority_key_identifier_extension = true;

    let mut alt_names = Vec::new();
    for email in &options.subject_alt_email_names {
        alt_names.push(SanType::Rfc822Name(email.clone().try_into()?));
    }
    params.subject_alt_names = alt_names;

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::DnValue;

    fn dn_value(dn: &DistinguishedName, ty: DnType) -> Option<String> {
        dn.get(&ty).map(|value| match value {
            DnValue::Utf8String(s) => s.clone(),
            DnValue::PrintableString(s) => s.as_str().to_string(),
            other => format!("{other:?}"),
        })
    }

    #[test]
    fn test_subject_defaults_country() {
        let dn = subject_name(&SubjectOptions::default());
        assert_eq!(dn_value(&dn, DnType::CountryName).as_deref(), Some("US"));
        assert!(dn_value(&dn, DnType::CommonName).is_none());
    }

    #[test]
    fn test_subject_optional_fields() {
        let options = SubjectOptions {
            common_name: Some("svc".to_string()),
            country: Some("DE".to_string()),
            organizations: vec!["Acme".to_string()],
            organizational_units: vec!["Ops".to_string()],
            locality: Some("Berlin".to_string()),
            state: Some("BE".to_string()),
        };
        let dn = subject_name(&options);

        assert_eq!(dn_value(&dn, DnType::CountryName).as_deref(), Some("DE"));
        assert_eq!(dn_value(&dn, DnType::CommonName).as_deref(), Some("svc"));
        assert_eq!(
            dn_value(&dn, DnType::OrganizationName).as_deref(),
            Some("Acme")
        );
        assert_eq!(
            dn_value(&dn, DnType::OrganizationalUnitName).as_deref(),
            Some("Ops")
        );
        assert_eq!(
            dn_value(&dn, DnType::LocalityName).as_deref(),
            Some("Berlin")
        );
        assert_eq!(
            dn_value(&dn, DnType::StateOrProvinceName).as_deref(),
            Some("BE")
        );
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime("2030-01-01T00:00:00Z").is_ok());
        assert!(parse_datetime("2030-01-01T00:00:00").is_ok());
        assert!(parse_datetime("2030-01-01").is_ok());
        assert!(parse_datetime("next tuesday").is_err());
    }

    #[test]
    fn test_resolve_validity_defaults() {
        let (not_before, not_after) = resolve_validity(&ValidityOptions::default()).unwrap();
        let now = OffsetDateTime::now_utc();

        assert!((now - not_before) - Duration::days(1) < Duration::minutes(5));
        assert!((not_after - now) - Duration::days(5 * 365) < Duration::minutes(5));
    }

    #[test]
    fn test_resolve_validity_expired() {
        let options = ValidityOptions {
            expired: true,
            ..Default::default()
        };
        let (not_before, not_after) = resolve_validity(&options).unwrap();
        let now = OffsetDateTime::now_utc();

        assert!((now - not_before) - Duration::days(5 * 365) < Duration::minutes(5));
        assert!((now - not_after) - Duration::days(1) < Duration::minutes(5));
        assert!(not_after < now);
    }

    #[test]
    fn test_resolve_validity_explicit_bounds() {
        let options = ValidityOptions {
            expired: false,
            valid_from: Some("2050-01-01T00:00:00".to_string()),
            valid_to: Some("2051-01-01T00:00:00".to_string()),
        };
        let (not_before, not_after) = resolve_validity(&options).unwrap();

        assert_eq!(not_before.year(), 2050);
        assert_eq!(not_after.year(), 2051);
    }

    #[test]
    fn test_resolve_validity_inverted_range() {
        let options = ValidityOptions {
            expired: false,
            valid_from: Some("2051-01-01T00:00:00".to_string()),
            valid_to: Some("2050-01-01T00:00:00".to_string()),
        };
        let result = resolve_validity(&options);

        assert!(matches!(result, Err(CertmintError::ValidityRangeError { .. })));
    }

    #[test]
    fn test_effective_expired_from_past_valid_to() {
        let options = ValidityOptions {
            expired: false,
            valid_from: None,
            valid_to: Some("2001-01-01T00:00:00".to_string()),
        };
        assert!(effective_expired(&options).unwrap());

        let options = ValidityOptions {
            expired: false,
            valid_from: None,
            valid_to: Some("2999-01-01T00:00:00".to_string()),
        };
        assert!(!effective_expired(&options).unwrap());
    }

    #[test]
    fn test_ca_params_extensions() {
        let params = ca_params(&CaOptions::default(), false).unwrap();

        assert!(matches!(params.is_ca, IsCa::Ca(_)));
        assert!(params.key_usages.contains(&KeyUsagePurpose::KeyCertSign));
        assert!(params.key_usages.contains(&KeyUsagePurpose::CrlSign));
        assert!(!params.use_authority_key_identifier_extension);
        assert!(params.extended_key_usages.is_empty());
    }

    #[test]
    fn test_intermediate_params_reference_parent() {
        let params = ca_params(&CaOptions::default(), true).unwrap();

        assert!(params.use_authority_key_identifier_extension);
        assert_eq!(
            params.extended_key_usages,
            vec![ExtendedKeyUsagePurpose::ServerAuth]
        );
    }

    #[test]
    fn test_server_params_localhost_alt_names() {
        let host = LocalHost {
            dns_name: "build-host".to_string(),
            addresses: vec![Ipv4Addr::new(10, 0, 0, 7)],
        };
        let options = ServerOptions {
            subject_alt_dns_names: vec!["svc.internal".to_string()],
            subject_alt_ip_names: vec!["192.168.1.5".to_string()],
            ..Default::default()
        };
        let params = server_params(&options, Some(&host)).unwrap();

        // hostname, localhost, 127.0.0.1, one interface address, plus the
        // two caller-supplied names
        assert_eq!(params.subject_alt_names.len(), 6);
        assert!(matches!(params.is_ca, IsCa::ExplicitNoCa));
        assert!(params.use_authority_key_identifier_extension);
        assert!(params
            .subject_alt_names
            .contains(&SanType::IpAddress(IpAddr::V4(Ipv4Addr::LOCALHOST))));
    }

    #[test]
    fn test_server_params_without_alt_names() {
        let params = server_params(&ServerOptions::default(), None).unwrap();
        assert!(params.subject_alt_names.is_empty());
    }

    #[test]
    fn test_server_params_invalid_ip() {
        let options = ServerOptions {
            subject_alt_ip_names: vec!["not-an-ip".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            server_params(&options, None),
            Err(CertmintError::ParseError(_))
        ));
    }

    #[test]
    fn test_user_params_email_alt_names() {
        let options = UserOptions {
            subject_alt_email_names: vec!["alice@example.com".to_string()],
            ..Default::default()
        };
        let params = user_params(&options).unwrap();

        assert_eq!(params.subject_alt_names.len(), 1);
        assert!(!params
            .key_usages
            .contains(&KeyUsagePurpose::ContentCommitment));
        assert!(!params
            .key_usages
            .contains(&KeyUsagePurpose::DataEncipherment));
    }
}
