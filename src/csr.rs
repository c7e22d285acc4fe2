//! PKCS#10 certification requests ([RFC 2986]).
//!
//! [RFC 2986]: https://datatracker.ietf.org/doc/html/rfc2986

use const_oid::ObjectIdentifier;
use der::{
    asn1::{Any, AnyRef, BitString, PrintableStringRef, SetOfVec, Utf8StringRef},
    Decode, Encode,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::{
    attr::AttributeTypeAndValue,
    name::{Name, RdnSequence, RelativeDistinguishedName},
    request::{CertReq, CertReqInfo, Version},
};

use crate::algorithm::SignatureAlgorithm;
use crate::codec;
use crate::config::CSR_SIGNATURE_ALGORITHM;
use crate::errors::{Error, Result};
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::signing;

/// PEM label of a PKCS#10 request.
pub const CSR_PEM_LABEL: &str = "CERTIFICATE REQUEST";

/// `id-at-serialNumber`
pub const SERIAL_NUMBER_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.5");
/// `id-at-commonName`
pub const COMMON_NAME_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// `id-at-surname`
pub const SURNAME_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.4");
/// `id-at-organizationName`
pub const ORGANIZATION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
/// `id-at-countryName`
pub const COUNTRY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
/// `id-at-localityName`
pub const LOCALITY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
/// `id-at-givenName`
pub const GIVEN_NAME_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.42");

/// Subject distinguished name attributes of a request.
///
/// Absent fields are left out of the name entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct SubjectFields {
    /// `serialNumber` (2.5.4.5)
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub serial_number: Option<String>,
    /// `commonName` (2.5.4.3)
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub common_name: Option<String>,
    /// `surname` (2.5.4.4)
    #[cfg_attr(
        feature = "serde",
        serde(rename = "surName", skip_serializing_if = "Option::is_none")
    )]
    pub surname: Option<String>,
    /// `organizationName` (2.5.4.10)
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub organization: Option<String>,
    /// `countryName` (2.5.4.6)
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub country: Option<String>,
    /// `localityName` (2.5.4.7)
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub locality: Option<String>,
    /// `givenName` (2.5.4.42)
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub given_name: Option<String>,
}

/// How an attribute value is tagged in the name.
#[derive(Clone, Copy)]
enum StringKind {
    /// PrintableString when every character allows it, UTF8String otherwise.
    PreferPrintable,
    Utf8,
}

impl SubjectFields {
    /// Build from `(key, value)` pairs keyed `serialNumber`, `commonName`,
    /// `surName`, `organization`, `country`, `locality` and `givenName`.
    /// Other keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut fields = SubjectFields::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "serialNumber" => &mut fields.serial_number,
                "commonName" => &mut fields.common_name,
                "surName" => &mut fields.surname,
                "organization" => &mut fields.organization,
                "country" => &mut fields.country,
                "locality" => &mut fields.locality,
                "givenName" => &mut fields.given_name,
                other => {
                    tracing::debug!(key = other, "ignoring unknown subject field");
                    continue;
                }
            };
            *slot = Some(value.into());
        }
        fields
    }

    /// Populated attributes in name order.
    fn attributes(&self) -> Vec<(ObjectIdentifier, &str, StringKind)> {
        [
            (SERIAL_NUMBER_OID, &self.serial_number, StringKind::PreferPrintable),
            (COMMON_NAME_OID, &self.common_name, StringKind::Utf8),
            (SURNAME_OID, &self.surname, StringKind::Utf8),
            (ORGANIZATION_OID, &self.organization, StringKind::Utf8),
            (COUNTRY_OID, &self.country, StringKind::PreferPrintable),
            (LOCALITY_OID, &self.locality, StringKind::Utf8),
            (GIVEN_NAME_OID, &self.given_name, StringKind::Utf8),
        ]
        .into_iter()
        .filter_map(|(oid, value, kind)| value.as_deref().map(|value| (oid, value, kind)))
        .collect()
    }

    /// Number of populated attributes.
    pub fn len(&self) -> usize {
        self.attributes().len()
    }

    /// Whether no attribute is populated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// X.501 name with one single-valued RDN per populated attribute.
    pub fn to_name(&self) -> Result<Name> {
        let mut rdns = Vec::new();
        for (oid, value, kind) in self.attributes() {
            let printable = match kind {
                StringKind::PreferPrintable => PrintableStringRef::new(value).ok(),
                StringKind::Utf8 => None,
            };
            let value = match printable {
                Some(printable) => Any::encode_from(&printable),
                None => Any::encode_from(&Utf8StringRef::new(value).map_err(encoding)?),
            }
            .map_err(encoding)?;

            let set = SetOfVec::try_from(vec![AttributeTypeAndValue { oid, value }])
                .map_err(encoding)?;
            rdns.push(RelativeDistinguishedName(set));
        }

        Ok(RdnSequence(rdns))
    }
}

fn encoding(err: der::Error) -> Error {
    Error::Signing(format!("cannot encode certification request: {err}"))
}

/// Build a DER encoded PKCS#10 request for `subject` carrying `public_key`
/// and signed by `private_key` with SHA1withRSA.
///
/// Both keys must belong to the same pair.
pub fn build_csr(
    private_key: &RsaPrivateKey,
    public_key: &RsaPublicKey,
    subject: &SubjectFields,
) -> Result<Vec<u8>> {
    if !private_key.matches(public_key) {
        tracing::warn!("refusing certification request for mismatched keys");
        return Err(Error::KeyMismatch);
    }

    let public_key_der = public_key.to_der()?;
    let info = CertReqInfo {
        version: Version::V1,
        subject: subject.to_name()?,
        public_key: SubjectPublicKeyInfoOwned::from_der(&public_key_der).map_err(encoding)?,
        attributes: Default::default(),
    };

    let info_der = info.to_der().map_err(encoding)?;
    let signature = signing::sign(private_key, CSR_SIGNATURE_ALGORITHM, &info_der)?;

    let request = CertReq {
        info,
        algorithm: AlgorithmIdentifierOwned {
            oid: CSR_SIGNATURE_ALGORITHM.oid(),
            parameters: Some(Any::from(AnyRef::NULL)),
        },
        signature: BitString::from_bytes(&signature).map_err(encoding)?,
    };

    let der = request.to_der().map_err(encoding)?;
    tracing::debug!(
        fields = subject.len(),
        bytes = der.len(),
        "built certification request"
    );
    Ok(der)
}

/// [`build_csr`], wrapped in a `CERTIFICATE REQUEST` PEM document.
pub fn build_csr_pem(
    private_key: &RsaPrivateKey,
    public_key: &RsaPublicKey,
    subject: &SubjectFields,
) -> Result<String> {
    let der = build_csr(private_key, public_key, subject)?;
    codec::der_to_pem(CSR_PEM_LABEL, &der)
}

/// Check the self-signature of a DER encoded request against the public
/// key it carries. Malformed input yields `false`.
pub fn verify_csr(der: &[u8]) -> bool {
    let request = match CertReq::from_der(der) {
        Ok(request) => request,
        Err(_) => return false,
    };

    let algorithm = match SignatureAlgorithm::ALL
        .into_iter()
        .find(|alg| alg.oid() == request.algorithm.oid)
    {
        Some(algorithm) => algorithm,
        None => return false,
    };

    let public_key = match request
        .info
        .public_key
        .to_der()
        .map_err(Error::from)
        .and_then(|spki| RsaPublicKey::from_der(&spki))
    {
        Ok(public_key) => public_key,
        Err(_) => return false,
    };

    let (info_der, signature) = match (request.info.to_der(), request.signature.as_bytes()) {
        (Ok(info_der), Some(signature)) => (info_der, signature),
        _ => return false,
    };

    signing::verify(&public_key, algorithm, &info_der, signature)
}
