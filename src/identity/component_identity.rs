use std::fmt;
use std::fmt::Display;
use std::hash::Hash;
use std::hash::Hasher;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::IdentityError;

/// Four-part ordinal component version (`major.minor.build.revision`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentVersion {
    pub major: u16,
    pub minor: u16,
    pub build: u16,
    pub revision: u16,
}

impl ComponentVersion {
    pub const fn new(
        major: u16,
        minor: u16,
        build: u16,
        revision: u16,
    ) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl Display for ComponentVersion {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Eight-byte public key fingerprint of a signed component.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKeyToken([u8; 8]);

impl PublicKeyToken {
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl Display for PublicKeyToken {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PublicKeyToken {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "PublicKeyToken({})", self)
    }
}

/// A partially-or-fully-qualified component name.
///
/// Immutable after construction. `name` is always present; every other
/// field left unset means "not constrained" for matching purposes. Name and
/// culture comparisons are ASCII case-insensitive everywhere — component
/// names are never distinguished by casing.
///
/// The canonical textual form is
/// `Name[, Version=#.#.#.#][, Culture=xx-xx][, PublicKeyToken=<16 hex|null>]`.
#[derive(Debug, Clone)]
pub struct ComponentIdentity {
    name: String,
    version: Option<ComponentVersion>,
    culture: Option<String>,
    public_key_token: Option<PublicKeyToken>,
}

impl ComponentIdentity {
    /// Creates a name-only identity. The name is the one required field;
    /// an empty or whitespace-only name is rejected.
    pub fn new(name: impl Into<String>) -> std::result::Result<Self, IdentityError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IdentityError::EmptyName);
        }
        Ok(Self {
            name,
            version: None,
            culture: None,
            public_key_token: None,
        })
    }

    pub fn with_version(
        mut self,
        version: ComponentVersion,
    ) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the culture constraint. Cultures are normalized to lowercase;
    /// an empty or `neutral` culture leaves the field unconstrained.
    pub fn with_culture(
        mut self,
        culture: impl Into<String>,
    ) -> Self {
        let culture = culture.into().to_ascii_lowercase();
        self.culture = if culture.is_empty() || culture == "neutral" {
            None
        } else {
            Some(culture)
        };
        self
    }

    pub fn with_public_key_token(
        mut self,
        token: PublicKeyToken,
    ) -> Self {
        self.public_key_token = Some(token);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&ComponentVersion> {
        self.version.as_ref()
    }

    pub fn culture(&self) -> Option<&str> {
        self.culture.as_deref()
    }

    pub fn public_key_token(&self) -> Option<&PublicKeyToken> {
        self.public_key_token.as_ref()
    }

    /// Lowercased name, used as the cache key so that casing never splits
    /// records for the same component.
    pub(crate) fn key_name(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Parses the canonical textual form. Attribute keys are
    /// case-insensitive; `Culture=neutral` and `PublicKeyToken=null` leave
    /// the field unconstrained. Every failure names the raw input.
    pub fn parse(raw: &str) -> std::result::Result<Self, IdentityError> {
        let mut segments = raw.split(',');

        // First segment is always the name
        let name = segments.next().unwrap_or("").trim();
        let mut identity = Self::new(name)?;

        let mut seen_version = false;
        let mut seen_culture = false;
        let mut seen_token = false;

        for segment in segments {
            let segment = segment.trim();
            let Some((key, value)) = segment.split_once('=') else {
                return Err(IdentityError::MalformedAttribute {
                    raw: raw.to_string(),
                    segment: segment.to_string(),
                });
            };
            let key = key.trim();
            let value = value.trim();

            match key.to_ascii_lowercase().as_str() {
                "version" => {
                    mark_once(raw, key, &mut seen_version)?;
                    identity.version = Some(parse_version(raw, value)?);
                }
                "culture" => {
                    mark_once(raw, key, &mut seen_culture)?;
                    identity = identity.with_culture(value);
                }
                "publickeytoken" => {
                    mark_once(raw, key, &mut seen_token)?;
                    identity.public_key_token = parse_token(raw, value)?;
                }
                _ => {
                    return Err(IdentityError::UnknownAttribute {
                        raw: raw.to_string(),
                        attribute: key.to_string(),
                    });
                }
            }
        }

        Ok(identity)
    }

    /// Decides whether this pattern matches a concrete runtime identity.
    ///
    /// Names must match case-insensitively; each set field must match
    /// exactly (culture case-insensitively, token byte-for-byte); each
    /// unset field matches anything.
    pub fn matches(
        &self,
        concrete: &ComponentIdentity,
    ) -> bool {
        if !self.name.eq_ignore_ascii_case(&concrete.name) {
            return false;
        }
        if let Some(version) = &self.version {
            if concrete.version.as_ref() != Some(version) {
                return false;
            }
        }
        if let Some(culture) = &self.culture {
            match &concrete.culture {
                Some(found) if found.eq_ignore_ascii_case(culture) => {}
                _ => return false,
            }
        }
        if let Some(token) = &self.public_key_token {
            if concrete.public_key_token.as_ref() != Some(token) {
                return false;
            }
        }
        true
    }
}

fn mark_once(
    raw: &str,
    key: &str,
    seen: &mut bool,
) -> std::result::Result<(), IdentityError> {
    if *seen {
        return Err(IdentityError::DuplicateAttribute {
            raw: raw.to_string(),
            attribute: key.to_string(),
        });
    }
    *seen = true;
    Ok(())
}

fn parse_version(
    raw: &str,
    value: &str,
) -> std::result::Result<ComponentVersion, IdentityError> {
    let invalid = || IdentityError::InvalidVersion {
        raw: raw.to_string(),
        value: value.to_string(),
    };

    let mut parts = value.split('.');
    let mut next_ordinal = || -> std::result::Result<u16, IdentityError> {
        parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())
    };

    let version = ComponentVersion {
        major: next_ordinal()?,
        minor: next_ordinal()?,
        build: next_ordinal()?,
        revision: next_ordinal()?,
    };
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(version)
}

fn parse_token(
    raw: &str,
    value: &str,
) -> std::result::Result<Option<PublicKeyToken>, IdentityError> {
    if value.eq_ignore_ascii_case("null") || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    let invalid = || IdentityError::InvalidPublicKeyToken {
        raw: raw.to_string(),
        value: value.to_string(),
    };

    if value.len() != 16 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let mut bytes = [0u8; 8];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&value[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
    }
    Ok(Some(PublicKeyToken(bytes)))
}

impl Display for ComponentIdentity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(version) = &self.version {
            write!(f, ", Version={}", version)?;
        }
        if let Some(culture) = &self.culture {
            write!(f, ", Culture={}", culture)?;
        }
        if let Some(token) = &self.public_key_token {
            write!(f, ", PublicKeyToken={}", token)?;
        }
        Ok(())
    }
}

impl FromStr for ComponentIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for ComponentIdentity {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.version == other.version
            && self.culture == other.culture
            && self.public_key_token == other.public_key_token
    }
}

impl Eq for ComponentIdentity {}

impl Hash for ComponentIdentity {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.key_name().hash(state);
        self.version.hash(state);
        self.culture.hash(state);
        self.public_key_token.hash(state);
    }
}

/// A value that can name the component on whose behalf an override lookup
/// runs. Identity resolution happens at the call site, not inside the
/// cache: each module hands in its own statically-known identity.
pub trait IdentifiesComponent {
    fn component_identity(&self) -> ComponentIdentity;
}

impl IdentifiesComponent for ComponentIdentity {
    fn component_identity(&self) -> ComponentIdentity {
        self.clone()
    }
}
