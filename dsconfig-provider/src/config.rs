//! The provider configuration block, with environment variable fallbacks.

use std::{collections::BTreeSet, fmt, path::PathBuf, str::FromStr};

use anyhow::{bail, Context, Result};
use dsconfig_client::HttpConfig;
use dsconfig_resource::{
    diagnostics::Diagnostics,
    schema::{Attribute, Schema},
    value::{Attr, AttributeValues},
};

pub const HTTPS_HOST_ENV: &str = "DSCONFIG_HTTPS_HOST";
pub const USERNAME_ENV: &str = "DSCONFIG_USERNAME";
pub const PASSWORD_ENV: &str = "DSCONFIG_PASSWORD";
pub const INSECURE_TRUST_ALL_TLS_ENV: &str = "DSCONFIG_INSECURE_TRUST_ALL_TLS";
/// Comma separated paths.
pub const CA_CERTIFICATE_PEM_FILES_ENV: &str = "DSCONFIG_CA_CERTIFICATE_PEM_FILES";
pub const PRODUCT_VERSION_ENV: &str = "DSCONFIG_PRODUCT_VERSION";

/// Looks up an environment variable.
pub type Env = dyn Fn(&str) -> Option<String> + Send + Sync;

pub fn schema() -> Schema {
    Schema::new("Connection to the directory server's configuration API.")
        .attribute(
            "https_host",
            Attribute::string(&format!(
                "URI for the server's HTTPS interface, e.g. `https://localhost:1443`. Default value can be set with the `{}` environment variable.",
                HTTPS_HOST_ENV
            )),
        )
        .attribute(
            "username",
            Attribute::string(&format!(
                "Username for the server admin user. Default value can be set with the `{}` environment variable.",
                USERNAME_ENV
            )),
        )
        .attribute(
            "password",
            Attribute::string(&format!(
                "Password for the server admin user. Default value can be set with the `{}` environment variable.",
                PASSWORD_ENV
            ))
            .sensitive(),
        )
        .attribute(
            "insecure_trust_all_tls",
            Attribute::bool(&format!(
                "Set to true to trust any certificate when connecting to the server. This is insecure and should not be enabled outside of testing. Default value can be set with the `{}` environment variable.",
                INSECURE_TRUST_ALL_TLS_ENV
            )),
        )
        .attribute(
            "ca_certificate_pem_files",
            Attribute::string_set(&format!(
                "Paths to files containing PEM-encoded certificates to be trusted as root CAs when connecting to the server. Default value can be set with the `{}` environment variable, using commas to delimit multiple files.",
                CA_CERTIFICATE_PEM_FILES_ENV
            )),
        )
        .attribute(
            "product_version",
            Attribute::string(&format!(
                "Version of the server that will be configured, e.g. `9.3.0.0`. Default value can be set with the `{}` environment variable.",
                PRODUCT_VERSION_ENV
            )),
        )
}

/// A `major.minor[.patch[.build]]` server version. Only major and minor are
/// significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProductVersion {
    pub major: u32,
    pub minor: u32,
}

impl ProductVersion {
    pub const MINIMUM: ProductVersion = ProductVersion { major: 9, minor: 1 };

    /// Versions this provider was built against.
    pub const SUPPORTED: &'static [ProductVersion] = &[
        ProductVersion { major: 9, minor: 1 },
        ProductVersion { major: 9, minor: 2 },
        ProductVersion { major: 9, minor: 3 },
    ];

    /// Check the version can be managed. Newer versions than the known ones
    /// are allowed with a warning.
    pub fn check(&self, diags: &mut Diagnostics) {
        if *self < Self::MINIMUM {
            diags.attribute_error(
                "product_version",
                "Unsupported product version",
                format!(
                    "Version {} is not supported. The minimum supported version is {}.",
                    self,
                    Self::MINIMUM
                ),
            );
        } else if !Self::SUPPORTED.contains(self) {
            let latest = Self::SUPPORTED.last().copied().unwrap_or(Self::MINIMUM);
            diags.attribute_warning(
                "product_version",
                "Unrecognized product version",
                format!(
                    "Version {} is newer than the latest known version {}. Configuration objects are managed as for {}.",
                    self, latest, latest
                ),
            );
        }
    }
}

impl FromStr for ProductVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split('.')
            .map(|p| p.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("invalid product version {:?}", s))?;
        match parts.as_slice() {
            [major, minor, rest @ ..] if rest.len() <= 2 => Ok(ProductVersion {
                major: *major,
                minor: *minor,
            }),
            _ => bail!(
                "invalid product version {:?}: expected a version such as 9.3.0.0",
                s
            ),
        }
    }
}

impl fmt::Display for ProductVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The resolved provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub https_host: String,
    pub username: String,
    pub password: String,
    pub insecure_trust_all_tls: bool,
    pub ca_certificate_pem_files: Vec<PathBuf>,
    pub product_version: ProductVersion,
}

impl ProviderConfig {
    /// Resolve the configuration block, falling back to `env` for anything
    /// not set.
    pub fn resolve(values: &AttributeValues, env: &Env, diags: &mut Diagnostics) -> Option<Self> {
        let https_host = required_setting(values, env, "https_host", HTTPS_HOST_ENV, diags);
        let username = required_setting(values, env, "username", USERNAME_ENV, diags);
        let password = required_setting(values, env, "password", PASSWORD_ENV, diags);
        let product_version =
            required_setting(values, env, "product_version", PRODUCT_VERSION_ENV, diags)
                .and_then(|v| match v.parse::<ProductVersion>() {
                    Ok(v) => Some(v),
                    Err(e) => {
                        diags.attribute_error("product_version", "Invalid product version", format!("{:#}", e));
                        None
                    }
                });

        let insecure_trust_all_tls = match values.get::<bool>("insecure_trust_all_tls") {
            Ok(Attr::Known(b)) => b,
            _ => match env(INSECURE_TRUST_ALL_TLS_ENV) {
                Some(v) => match v.trim().parse::<bool>() {
                    Ok(b) => b,
                    Err(_) => {
                        diags.attribute_error(
                            "insecure_trust_all_tls",
                            "Invalid environment variable",
                            format!("{} must be true or false, got {:?}.", INSECURE_TRUST_ALL_TLS_ENV, v),
                        );
                        false
                    }
                },
                None => false,
            },
        };

        let ca_certificate_pem_files = match values.get::<BTreeSet<String>>("ca_certificate_pem_files") {
            Ok(Attr::Known(files)) => files.into_iter().map(PathBuf::from).collect(),
            _ => env(CA_CERTIFICATE_PEM_FILES_ENV)
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(PathBuf::from)
                        .collect()
                })
                .unwrap_or_default(),
        };

        if let Some(version) = &product_version {
            version.check(diags);
        }
        if diags.has_errors() {
            return None;
        }
        Some(ProviderConfig {
            https_host: https_host?,
            username: username?,
            password: password?,
            insecure_trust_all_tls,
            ca_certificate_pem_files,
            product_version: product_version?,
        })
    }

    /// Connection settings for the API client. Reads the CA certificates.
    pub fn http_config(&self, user_agent: &str) -> Result<HttpConfig> {
        let ca_certificates_pem = self
            .ca_certificate_pem_files
            .iter()
            .map(|path| {
                std::fs::read(path)
                    .with_context(|| format!("could not read CA certificate file {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(HttpConfig {
            https_host: self.https_host.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            insecure_trust_all_tls: self.insecure_trust_all_tls,
            ca_certificates_pem,
            user_agent: user_agent.to_string(),
        })
    }
}

fn required_setting(
    values: &AttributeValues,
    env: &Env,
    attribute: &str,
    variable: &str,
    diags: &mut Diagnostics,
) -> Option<String> {
    if let Ok(Attr::Known(value)) = values.get::<String>(attribute) {
        if !value.is_empty() {
            return Some(value);
        }
    }
    match env(variable) {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            diags.attribute_error(
                attribute,
                "Missing provider configuration",
                format!(
                    "{:?} must be set in the provider configuration or with the {} environment variable.",
                    attribute, variable
                ),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, io::Write};

    use serde_json::json;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + Send + Sync {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn full_config() -> AttributeValues {
        AttributeValues::new()
            .with("https_host", "https://localhost:1443")
            .with("username", "cn=admin")
            .with("password", "secret")
            .with("product_version", "9.3.0.0")
    }

    #[test]
    fn versions() {
        assert_eq!(
            "9.3.0.0".parse::<ProductVersion>().unwrap(),
            ProductVersion { major: 9, minor: 3 }
        );
        assert_eq!(
            "10.0".parse::<ProductVersion>().unwrap(),
            ProductVersion { major: 10, minor: 0 }
        );
        assert!("9".parse::<ProductVersion>().is_err());
        assert!("9.3.0.0.1".parse::<ProductVersion>().is_err());
        assert!("nine.three".parse::<ProductVersion>().is_err());

        let mut diags = Diagnostics::new();
        ProductVersion { major: 9, minor: 2 }.check(&mut diags);
        assert!(diags.is_empty());

        ProductVersion { major: 9, minor: 0 }.check(&mut diags);
        assert!(diags.has_errors());

        let mut diags = Diagnostics::new();
        ProductVersion { major: 10, minor: 1 }.check(&mut diags);
        assert!(diags.has_warnings());
        assert!(!diags.has_errors());
    }

    #[test]
    fn configuration_block_wins_over_environment() {
        let env = env(&[(HTTPS_HOST_ENV, "https://other:443"), (PASSWORD_ENV, "other")]);
        let mut diags = Diagnostics::new();
        let config = ProviderConfig::resolve(&full_config(), &env, &mut diags).unwrap();
        assert!(diags.is_empty());
        assert_eq!(config.https_host, "https://localhost:1443");
        assert_eq!(config.password, "secret");
        assert!(!config.insecure_trust_all_tls);
        assert_eq!(config.product_version, ProductVersion { major: 9, minor: 3 });
    }

    #[test]
    fn environment_fallbacks() {
        let env = env(&[
            (HTTPS_HOST_ENV, "https://ds.example.com:1443"),
            (USERNAME_ENV, "cn=admin"),
            (PASSWORD_ENV, "secret"),
            (PRODUCT_VERSION_ENV, "9.1.0.0"),
            (INSECURE_TRUST_ALL_TLS_ENV, "true"),
            (CA_CERTIFICATE_PEM_FILES_ENV, "/etc/ca1.pem, /etc/ca2.pem"),
        ]);
        let mut diags = Diagnostics::new();
        let config = ProviderConfig::resolve(&AttributeValues::new(), &env, &mut diags).unwrap();
        assert_eq!(config.https_host, "https://ds.example.com:1443");
        assert!(config.insecure_trust_all_tls);
        assert_eq!(
            config.ca_certificate_pem_files,
            vec![PathBuf::from("/etc/ca1.pem"), PathBuf::from("/etc/ca2.pem")]
        );
    }

    #[test]
    fn missing_settings_are_reported_together() {
        let mut diags = Diagnostics::new();
        let config = ProviderConfig::resolve(
            &AttributeValues::new().with("username", "cn=admin"),
            &env(&[]),
            &mut diags,
        );
        assert_eq!(config, None);
        let attributes: Vec<_> = diags
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert_eq!(attributes, vec!["https_host", "password", "product_version"]);
    }

    #[test]
    fn old_versions_are_rejected() {
        let mut diags = Diagnostics::new();
        let config = ProviderConfig::resolve(
            &full_config().with("product_version", "8.3.0.0"),
            &env(&[]),
            &mut diags,
        );
        assert_eq!(config, None);
        assert_eq!(diags.iter().next().unwrap().summary, "Unsupported product version");
    }

    #[test]
    fn ca_certificates_are_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"-----BEGIN CERTIFICATE-----\n").unwrap();

        let mut diags = Diagnostics::new();
        let config = ProviderConfig::resolve(
            &full_config().with(
                "ca_certificate_pem_files",
                json!([file.path().to_str().unwrap()]),
            ),
            &env(&[]),
            &mut diags,
        )
        .unwrap();
        let http = config.http_config("dsconfig-provider/0.1.0").unwrap();
        assert_eq!(http.ca_certificates_pem, vec![b"-----BEGIN CERTIFICATE-----\n".to_vec()]);
        assert_eq!(http.user_agent, "dsconfig-provider/0.1.0");

        let dir = tempfile::tempdir().unwrap();
        let missing = ProviderConfig {
            ca_certificate_pem_files: vec![dir.path().join("missing.pem")],
            ..config
        };
        let e = missing.http_config("x").unwrap_err();
        assert!(format!("{:#}", e).contains("missing.pem"), "{:#}", e);
    }
}
