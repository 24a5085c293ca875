use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use console::style;
use semver::Version;

use crate::exec;
use crate::fetch;
use crate::pipeline::{fingerprint, source};

const PLIST_RELATIVE: &str =
    "Contents/Frameworks/Electron Framework.framework/Resources/Info.plist";
const RELEASE_BASE: &str = "https://github.com/electron/electron/releases/download";
const SHASUMS_TIMEOUT: Duration = Duration::from_secs(15);

/// Last Electron line Lumen is known to ship; used when the bundle does not
/// reveal its own version.
pub fn default_version() -> Version {
    Version::new(31, 7, 7)
}

/// Read the Electron version out of the bundled framework's Info.plist. A
/// missing or malformed plist falls back to the default with a warning
/// instead of failing the run.
pub fn detect_version(bundle: &Path) -> Version {
    let plist = bundle.join(PLIST_RELATIVE);
    let detected = fs::read_to_string(&plist)
        .ok()
        .and_then(|doc| parse_bundle_version(&doc));

    match detected {
        Some(version) => version,
        None => {
            let fallback = default_version();
            eprintln!(
                "{} could not detect the Electron version in the bundle, assuming {fallback}",
                style("warning:").yellow().bold()
            );
            fallback
        }
    }
}

pub fn parse_bundle_version(plist: &str) -> Option<Version> {
    let key = "<key>CFBundleVersion</key>";
    let at = plist.find(key)? + key.len();
    let rest = &plist[at..];

    let open = rest.find("<string>")? + "<string>".len();
    let rest = &rest[open..];
    let close = rest.find("</string>")?;

    Version::parse(rest[..close].trim()).ok()
}

pub fn arch_label() -> Result<&'static str, Box<dyn std::error::Error>> {
    match std::env::consts::ARCH {
        "x86_64" => Ok("x64"),
        "aarch64" => Ok("arm64"),
        other => Err(format!(
            "unsupported architecture {other}; prebuilt Electron exists for x86_64 and aarch64 only"
        )
        .into()),
    }
}

pub fn zip_name(version: &Version, arch: &str) -> String {
    format!("electron-v{version}-linux-{arch}.zip")
}

/// Download the matching Linux Electron release (cached across runs) and
/// unpack it into `electron_dir`.
pub fn acquire(
    version: &Version,
    arch: &str,
    cache_dir: &Path,
    electron_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = zip_name(version, arch);
    let zip = cache_dir.join(&name);

    if !zip.is_file() {
        let url = format!("{RELEASE_BASE}/v{version}/{name}");
        fetch::download(&url, &zip, &name)?;
        verify_release(version, &name, &zip)?;
    }

    fs::create_dir_all(electron_dir)?;
    let mut cmd = Command::new("unzip");
    cmd.arg("-o").arg("-q").arg(&zip).arg("-d").arg(electron_dir);
    exec::run_tool("runtime", &mut cmd)?;

    Ok(())
}

fn verify_release(
    version: &Version,
    name: &str,
    zip: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("{RELEASE_BASE}/v{version}/SHASUMS256.txt");
    let manifest = match fetch::fetch_text(&url, SHASUMS_TIMEOUT) {
        Ok(text) => text,
        Err(e) => {
            eprintln!(
                "{} Electron checksums unavailable, continuing unverified: {e}",
                style("warning:").yellow().bold()
            );
            return Ok(());
        }
    };

    let Some(expected) = source::expected_checksum(&manifest, name) else {
        eprintln!(
            "{} no entry for {name} in SHASUMS256.txt, continuing unverified",
            style("warning:").yellow().bold()
        );
        return Ok(());
    };

    let actual = fingerprint::sha256_file(zip)?;
    if actual != expected {
        fs::remove_file(zip).ok();
        return Err(format!("checksum mismatch for {name}: expected {expected}, got {actual}").into());
    }

    Ok(())
}
