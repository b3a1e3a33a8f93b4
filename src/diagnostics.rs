use crate::config::Config;

pub fn check(cfg: &Config) -> anyhow::Result<()> {
    let errors = collect(cfg);
    if errors.is_empty() {
        return Ok(());
    }

    for err in &errors {
        eprintln!("ERROR: {err}");
    }
    anyhow::bail!("{} preflight check(s) failed", errors.len());
}

fn collect(cfg: &Config) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();

    // Check 1: server URL usable
    match cfg.server_url() {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(format!(
            "--server {url} is not an http(s) URL\n  \
             → pass the relying party's base URL, e.g. https://example.com/api/auth"
        )),
        Err(e) => errors.push(format!("cannot parse --server '{}': {e}", cfg.server)),
    }

    // Check 2: origin has a host to derive the rp id from
    match cfg.origin_url() {
        Ok(url) if url.host_str().is_some() => {}
        Ok(url) => errors.push(format!("origin {url} has no host")),
        Err(e) => errors.push(format!(
            "cannot parse origin '{}': {e}",
            cfg.origin.as_deref().unwrap_or(&cfg.server)
        )),
    }

    // Check 3: identity well formed
    if let Err(e) = crate::identity::Identity::parse(cfg.identity.as_str()) {
        errors.push(format!("invalid --identity '{}': {e}", cfg.identity));
    }

    // Check 4: pinentry binary found
    if !cfg.yes {
        match std::process::Command::new(&cfg.pinentry)
            .arg("--version")
            .output()
        {
            Ok(_) => {}
            Err(e) => errors.push(format!(
                "pinentry binary not found: '{}': {e}\n  \
                 → install pinentry, or pass --yes to confirm without prompting",
                cfg.pinentry
            )),
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cfg(args: &[&str]) -> Config {
        let mut argv = vec!["ceremonium", "--yes"];
        argv.extend_from_slice(args);
        Config::parse_from(argv)
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(collect(&cfg(&["--identity", "alice"])).is_empty());
        assert!(check(&cfg(&["--identity", "alice"])).is_ok());
    }

    #[test]
    fn test_all_failures_collected() {
        let errors = collect(&cfg(&["--identity", "not valid", "--server", "ftp://x", "--origin", "nope"]));
        assert_eq!(errors.len(), 3, "{errors:?}");
    }

    #[test]
    fn test_missing_pinentry_reported() {
        let cfg = Config::parse_from([
            "ceremonium",
            "--identity",
            "alice",
            "--pinentry",
            "/nonexistent/pinentry-ceremonium",
        ]);
        let errors = collect(&cfg);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("pinentry"));
    }
}
