//! RSA key pair generation for token signing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

const RSA_KEY_BITS: usize = 2048;

/// Paths of a freshly written key pair.
#[derive(Debug)]
pub struct KeyFiles {
    pub private: PathBuf,
    pub public: PathBuf,
}

/// Writes `private.pem` (PKCS#1) and `public.pem` (SPKI) into `dir`.
pub fn generate_keypair(dir: &Path, force: bool) -> Result<KeyFiles> {
    let files = KeyFiles {
        private: dir.join("private.pem"),
        public: dir.join("public.pem"),
    };

    if (files.private.exists() || files.public.exists()) && !force {
        anyhow::bail!(
            "key pair already exists in {}, use --force to overwrite",
            dir.display()
        );
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("creating directory {}", dir.display()))?;

    let mut rng = rand::thread_rng();
    let private_key =
        RsaPrivateKey::new(&mut rng, RSA_KEY_BITS).context("generating private key")?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .context("encoding private key")?;
    let public_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .context("encoding public key")?;

    fs::write(&files.private, private_pem.as_bytes())
        .with_context(|| format!("writing {}", files.private.display()))?;
    fs::write(&files.public, public_pem.as_bytes())
        .with_context(|| format!("writing {}", files.public.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&files.private, fs::Permissions::from_mode(0o600))?;
    }

    Ok(files)
}
