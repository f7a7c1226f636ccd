//! Fetches the Kokoro model archive published with sherpa-onnx.
//!
//! The archive is downloaded to a temporary file next to its destination and
//! unpacked into `<model-dir>/tts/`.

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bzip2::read::BzDecoder;
use tracing::info;

use crate::config::{AppConfig, MODEL_NAME};

const RELEASE_URL: &str = "https://github.com/k2-fsa/sherpa-onnx/releases/download/tts-models";

/// URL of the model archive.
pub fn model_url() -> String {
    format!("{}/{}.tar.bz2", RELEASE_URL, MODEL_NAME)
}

/// Download and unpack the model unless it is already present.
///
/// Blocking; call from a blocking context.
pub fn ensure_model(config: &AppConfig) -> Result<()> {
    if config.model_present() {
        info!("Model already present at {}", config.tts_dir().display());
        return Ok(());
    }

    let tts_root = config.model_dir.join("tts");
    fs::create_dir_all(&tts_root).with_context(|| format!("failed creating {}", tts_root.display()))?;

    let archive_path = tts_root.join(format!("{}.tar.bz2", MODEL_NAME));
    download_file(&model_url(), &archive_path)?;

    info!("Unpacking {}", archive_path.display());
    let unpacked = unpack_archive(&archive_path, &tts_root);
    // The archive is only needed for unpacking
    let _ = fs::remove_file(&archive_path);
    unpacked?;

    if !config.model_present() {
        anyhow::bail!("Archive did not contain the expected model files under {}", config.tts_dir().display());
    }

    info!("✅ Model ready at {}", config.tts_dir().display());
    Ok(())
}

fn download_file(url: &str, dest: &Path) -> Result<()> {
    info!("Downloading {}...", url);

    let temp_path = temp_path_for(dest);
    let result = (|| -> Result<()> {
        let mut response = reqwest::blocking::get(url)
            .with_context(|| format!("http request failed for {url}"))?
            .error_for_status()
            .with_context(|| format!("download failed for {url}"))?;

        let mut file = File::create(&temp_path).with_context(|| format!("failed creating temp file {}", temp_path.display()))?;
        let bytes = io::copy(&mut response, &mut file).with_context(|| format!("failed writing to temp file {}", temp_path.display()))?;
        file.flush()?;

        fs::rename(&temp_path, dest).with_context(|| format!("failed moving {} to {}", temp_path.display(), dest.display()))?;
        info!("Downloaded {:.1} MB", bytes as f64 / 1_048_576.0);
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Unpack a `.tar.bz2` archive into `dest`.
fn unpack_archive(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).with_context(|| format!("failed opening {}", archive.display()))?;
    let decoder = BzDecoder::new(BufReader::new(file));
    tar::Archive::new(decoder).unpack(dest).with_context(|| format!("failed unpacking {}", archive.display()))?;
    Ok(())
}

fn temp_path_for(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".download.tmp");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::Compression;
    use bzip2::write::BzEncoder;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("kokoro-studio-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_model_url() {
        assert_eq!(model_url(), "https://github.com/k2-fsa/sherpa-onnx/releases/download/tts-models/kokoro-multi-lang-v1_0.tar.bz2");
    }

    #[test]
    fn test_temp_path_keeps_directory() {
        let temp = temp_path_for(Path::new("/models/tts/model.tar.bz2"));
        assert_eq!(temp, PathBuf::from("/models/tts/model.tar.bz2.download.tmp"));
    }

    #[test]
    fn test_unpack_archive() {
        let dir = scratch_dir("unpack");
        let archive_path = dir.join("test.tar.bz2");

        // Build a tiny .tar.bz2 with one file inside a model directory
        {
            let encoder = BzEncoder::new(File::create(&archive_path).unwrap(), Compression::fast());
            let mut builder = tar::Builder::new(encoder);
            let data = b"token 0\n";
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, format!("{}/tokens.txt", MODEL_NAME), &data[..]).unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }

        let out = dir.join("out");
        unpack_archive(&archive_path, &out).unwrap();
        assert_eq!(fs::read_to_string(out.join(MODEL_NAME).join("tokens.txt")).unwrap(), "token 0\n");

        fs::remove_dir_all(&dir).unwrap();
    }
}
