//! CLI surface (spec section 6). The flag set is fixed and short, so we
//! hand-parse `std::env::args()` the way the teacher's `resolve_config_path`
//! hand-parses its `-c`/`--config` flag, rather than pulling in a flag crate.

use std::net::SocketAddr;
use std::path::PathBuf;

/// `-web-addr auto|off|<port>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebAddr {
    Auto,
    Off,
    Port(u16),
}

/// `-web-cert auto|<path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebCert {
    Auto,
    Path(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: String,
    pub tls: bool,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub accounts: PathBuf,
    pub areas: Option<PathBuf>,
    pub mail: PathBuf,
    pub tells: PathBuf,
    pub admin: String,
    pub everyone_admin: bool,
    pub web_addr: WebAddr,
    pub web_cert: WebCert,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            addr: ":4000".to_string(),
            tls: false,
            cert: None,
            key: None,
            accounts: PathBuf::from("accounts.json"),
            areas: None,
            mail: PathBuf::from("mail.json"),
            tells: PathBuf::from("tells.json"),
            admin: "admin".to_string(),
            everyone_admin: false,
            web_addr: WebAddr::Off,
            web_cert: WebCert::Auto,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing value after {0}")]
    MissingValue(String),
    #[error("unrecognized argument: {0}")]
    Unrecognized(String),
    #[error("-tls requires both -cert and -key")]
    TlsMissingCertOrKey,
    #[error("invalid -web-addr value: {0}")]
    BadWebAddr(String),
}

pub const USAGE: &str = "\
Usage: emberholdd [flags]

  -addr <host:port>        listen address (default :4000)
  -tls                      wrap the listener in TLS
  -cert <path>              TLS certificate chain (PEM)
  -key <path>               TLS private key (PEM)
  -accounts <path>          account store JSON file (default accounts.json)
  -areas <path>             area JSON file (default: built-in starter area)
  -mail <path>              mail board JSON file (default mail.json)
  -tells <path>             offline tell JSON file (default tells.json)
  -admin <account>          account name granted Admin on login (default admin)
  -everyone-admin           grant every logged-in account Admin
  -web-addr auto|off|<port> staff portal listen address (default off)
  -web-cert auto|<path>     staff portal TLS certificate source (default auto)
  -h, --help                print this message and exit
";

impl Config {
    /// Parses CLI flags, failing fast on malformed or contradictory
    /// combinations before anything attempts to bind.
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Config, ConfigError> {
        let mut cfg = Config::default();
        let mut it = args.into_iter().peekable();

        while let Some(arg) = it.next() {
            match arg.as_str() {
                "-h" | "--help" => {
                    print!("{}", USAGE);
                    std::process::exit(0);
                }
                "-addr" => cfg.addr = next_value(&mut it, "-addr")?,
                "-tls" => cfg.tls = true,
                "-cert" => cfg.cert = Some(PathBuf::from(next_value(&mut it, "-cert")?)),
                "-key" => cfg.key = Some(PathBuf::from(next_value(&mut it, "-key")?)),
                "-accounts" => cfg.accounts = PathBuf::from(next_value(&mut it, "-accounts")?),
                "-areas" => cfg.areas = Some(PathBuf::from(next_value(&mut it, "-areas")?)),
                "-mail" => cfg.mail = PathBuf::from(next_value(&mut it, "-mail")?),
                "-tells" => cfg.tells = PathBuf::from(next_value(&mut it, "-tells")?),
                "-admin" => cfg.admin = next_value(&mut it, "-admin")?,
                "-everyone-admin" => cfg.everyone_admin = true,
                "-web-addr" => {
                    let v = next_value(&mut it, "-web-addr")?;
                    cfg.web_addr = match v.as_str() {
                        "auto" => WebAddr::Auto,
                        "off" => WebAddr::Off,
                        port => port
                            .parse::<u16>()
                            .map(WebAddr::Port)
                            .map_err(|_| ConfigError::BadWebAddr(v.clone()))?,
                    };
                }
                "-web-cert" => {
                    let v = next_value(&mut it, "-web-cert")?;
                    cfg.web_cert = match v.as_str() {
                        "auto" => WebCert::Auto,
                        path => WebCert::Path(PathBuf::from(path)),
                    };
                }
                other => return Err(ConfigError::Unrecognized(other.to_string())),
            }
        }

        if cfg.tls && (cfg.cert.is_none() || cfg.key.is_none()) {
            return Err(ConfigError::TlsMissingCertOrKey);
        }

        Ok(cfg)
    }

    /// Resolves `addr` (`:4000` style or `host:port`) into a bindable
    /// `SocketAddr`, defaulting the host to all interfaces.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let normalized = if let Some(rest) = self.addr.strip_prefix(':') {
            format!("0.0.0.0:{}", rest)
        } else {
            self.addr.clone()
        };
        normalized
            .parse()
            .or_else(|_| {
                use std::net::ToSocketAddrs;
                normalized
                    .to_socket_addrs()
                    .ok()
                    .and_then(|mut it| it.next())
                    .ok_or(())
            })
            .map_err(|_| anyhow::anyhow!("invalid -addr value: {}", self.addr))
    }
}

fn next_value(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, ConfigError> {
    it.next().ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_when_no_flags() {
        let cfg = Config::parse(args(&[])).unwrap();
        assert_eq!(cfg.addr, ":4000");
        assert!(!cfg.tls);
        assert_eq!(cfg.admin, "admin");
    }

    #[test]
    fn tls_without_cert_and_key_fails() {
        let err = Config::parse(args(&["-tls"])).unwrap_err();
        assert!(matches!(err, ConfigError::TlsMissingCertOrKey));
    }

    #[test]
    fn tls_with_cert_and_key_succeeds() {
        let cfg = Config::parse(args(&["-tls", "-cert", "c.pem", "-key", "k.pem"])).unwrap();
        assert!(cfg.tls);
    }

    #[test]
    fn web_addr_parses_variants() {
        assert_eq!(Config::parse(args(&["-web-addr", "auto"])).unwrap().web_addr, WebAddr::Auto);
        assert_eq!(Config::parse(args(&["-web-addr", "off"])).unwrap().web_addr, WebAddr::Off);
        assert_eq!(Config::parse(args(&["-web-addr", "8443"])).unwrap().web_addr, WebAddr::Port(8443));
        assert!(Config::parse(args(&["-web-addr", "bogus"])).is_err());
    }

    #[test]
    fn unrecognized_flag_rejected() {
        assert!(Config::parse(args(&["-bogus"])).is_err());
    }
}
