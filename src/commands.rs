//! File-level operations behind each command-line subcommand
//!
//! Every output holding secret or secret-derived data is created with mode
//! 0o600 (read/write for owner only) on Unix systems. Private keys are
//! additionally written atomically.

use crate::bundle;
use crate::decoy::{self, DecoyCheck};
use crate::envelope;
use crate::error::{ErrorCategory, ErrorKind, Result, SealkitError};
use crate::keynorm;
use crate::keys;
use crate::keysource::KeySource;
use crate::splitsig;
use crate::token;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use zeroize::Zeroizing;

/// Generate an RSA key pair and write both halves as PEM.
pub fn keygen(bits: usize, private_path: &Path, public_path: &Path) -> Result<()> {
    let pair = keys::generate_keypair(bits)?;
    write_file_atomic(private_path, pair.private_pem.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write {}", private_path.display())))?;
    fs::write(public_path, pair.public_pem.as_bytes()).map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to write {}", public_path.display()),
            e,
        )
    })?;
    tracing::info!(
        bits,
        private = %private_path.display(),
        public = %public_path.display(),
        "wrote key pair"
    );
    Ok(())
}

/// Seal the contents of `input_path` into an envelope written to `output_path`.
pub fn seal_file(
    input_path: &Path,
    output_path: &Path,
    key_source: &mut dyn KeySource,
) -> Result<()> {
    let plaintext = Zeroizing::new(fs::read(input_path).map_err(|e| read_error(input_path, e))?);
    let material = key_source.read_key_material()?;
    let key = keynorm::derive_key(&material)?;
    let sealed = envelope::seal(&key[..], &plaintext)
        .map_err(|e| e.with_context("failed to seal"))?;
    write_file_secure(output_path, sealed.as_bytes())
}

/// Open the envelope in `input_path` and write the plaintext to `output_path`.
pub fn open_file(
    input_path: &Path,
    output_path: &Path,
    key_source: &mut dyn KeySource,
) -> Result<()> {
    let sealed = read_text(input_path)?;
    let material = key_source.read_key_material()?;
    let key = keynorm::derive_key(&material)?;
    let plaintext = Zeroizing::new(
        envelope::open(&key[..], &sealed).map_err(|e| e.with_context("failed to open"))?,
    );
    write_file_secure(output_path, &plaintext)
}

/// Bundle the contents of two files into one token.
pub fn combine_files(
    first_path: &Path,
    second_path: &Path,
    output_path: &Path,
    key_source: &mut dyn KeySource,
) -> Result<()> {
    let first = Zeroizing::new(fs::read(first_path).map_err(|e| read_error(first_path, e))?);
    let second = Zeroizing::new(fs::read(second_path).map_err(|e| read_error(second_path, e))?);
    let material = key_source.read_key_material()?;
    let token = bundle::combine(&material, &first, &second)
        .map_err(|e| e.with_context("failed to combine"))?;
    write_file_secure(output_path, token.as_bytes())
}

/// Split a bundle token back into its two secrets.
pub fn split_file(
    input_path: &Path,
    first_path: &Path,
    second_path: &Path,
    key_source: &mut dyn KeySource,
) -> Result<()> {
    let token = read_text(input_path)?;
    let material = key_source.read_key_material()?;
    let (first, second) =
        bundle::split(&material, &token).map_err(|e| e.with_context("failed to split"))?;
    let (first, second) = (Zeroizing::new(first), Zeroizing::new(second));
    write_file_secure(first_path, &first)?;
    write_file_secure(second_path, &second)
}

/// Sign the contents of `input_path` and write a split-signature artifact.
pub fn sign_file(
    signer_key_path: &Path,
    recipient_key_path: &Path,
    input_path: &Path,
    output_path: &Path,
) -> Result<()> {
    let signer_pem =
        Zeroizing::new(fs::read(signer_key_path).map_err(|e| read_error(signer_key_path, e))?);
    let recipient_pem =
        fs::read(recipient_key_path).map_err(|e| read_error(recipient_key_path, e))?;
    let message = Zeroizing::new(fs::read(input_path).map_err(|e| read_error(input_path, e))?);

    let artifact = splitsig::produce_artifact(&signer_pem, &message, &recipient_pem)
        .map_err(|e| e.with_context("failed to produce artifact"))?;
    write_file_secure(output_path, artifact.as_bytes())
}

/// Recover the signed message from the artifact in `input_path`.
pub fn recover_file(
    recipient_key_path: &Path,
    signer_key_path: &Path,
    input_path: &Path,
    output_path: &Path,
) -> Result<()> {
    let recipient_pem = Zeroizing::new(
        fs::read(recipient_key_path).map_err(|e| read_error(recipient_key_path, e))?,
    );
    let signer_pem = fs::read(signer_key_path).map_err(|e| read_error(signer_key_path, e))?;
    let artifact = read_text(input_path)?;

    let message = Zeroizing::new(
        splitsig::recover_message(&recipient_pem, &signer_pem, &artifact)
            .map_err(|e| e.with_context("failed to recover message"))?,
    );
    write_file_secure(output_path, &message)
}

/// Write a decoy for `salt` to `output_path`.
pub fn decoy_file(salt: &[u8], output_path: &Path) -> Result<()> {
    let decoy = decoy::generate(salt)?;
    write_file_secure(output_path, &decoy)
}

/// Check the decoy in `input_path` against `salt`.
pub fn decoy_check_file(salt: &[u8], input_path: &Path) -> Result<DecoyCheck> {
    let decoy = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    decoy::extract(salt, &decoy)
}

/// Hash token of the contents of `input_path`.
pub fn hash_file(input_path: &Path, len: usize) -> Result<String> {
    let data = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    token::hash_token(&data, len)
}

/// Read a text token, ignoring surrounding whitespace such as a final newline.
fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| read_error(path, e))?;
    let text = String::from_utf8(bytes).map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Decode,
            format!("{} is not valid UTF-8", path.display()),
            e,
        )
    })?;
    Ok(text.trim().to_string())
}

/// Write a file atomically (tempfile + fsync + rename) with mode 0o600.
///
/// Either the previous file or the complete new file exists afterwards,
/// never a partial one.
fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to create tempfile",
            e,
        )
    })?;

    // NamedTempFile is created with mode 0o600 on Unix.
    temp_file.write_all(contents).map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to write to tempfile",
            e,
        )
    })?;
    temp_file.flush().map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to flush tempfile",
            e,
        )
    })?;
    temp_file.as_file().sync_all().map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    temp_file.persist(path).map_err(|e| {
        SealkitError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| {
                SealkitError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::Io,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })?;

        file.write_all(contents).map_err(|e| {
            SealkitError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).map_err(|e| {
            SealkitError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

fn read_error(path: &Path, err: io::Error) -> SealkitError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    SealkitError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::tests::{RECIPIENT_PRIVATE, RECIPIENT_PUBLIC, SIGNER_PRIVATE, SIGNER_PUBLIC};
    use crate::keysource::ConstantKeySource;
    use tempfile::TempDir;

    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_seal_open_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let sealed_path = temp_dir.path().join("plain.txt.sealed");
        let opened_path = temp_dir.path().join("opened.txt");

        fs::write(&plain_path, b"Hello, sealkit!").unwrap();

        let mut source = ConstantKeySource::new(b"test key".to_vec());
        seal_file(&plain_path, &sealed_path, &mut source).unwrap();
        open_file(&sealed_path, &opened_path, &mut source).unwrap();

        assert_eq!(fs::read(&opened_path).unwrap(), b"Hello, sealkit!");
    }

    #[test]
    fn test_open_tolerates_trailing_newline() {
        let temp_dir = TempDir::new().unwrap();
        let sealed_path = temp_dir.path().join("sealed");
        let opened_path = temp_dir.path().join("opened");

        let sealed = envelope::seal(&keynorm::normalize(b"key", 16), b"payload").unwrap();
        fs::write(&sealed_path, format!("{}\n", sealed)).unwrap();

        let mut source = ConstantKeySource::new(b"key".to_vec());
        open_file(&sealed_path, &opened_path, &mut source).unwrap();
        assert_eq!(fs::read(&opened_path).unwrap(), b"payload");
    }

    #[test]
    fn test_open_with_wrong_key_fails() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let sealed_path = temp_dir.path().join("sealed");
        let opened_path = temp_dir.path().join("opened");

        fs::write(&plain_path, b"a longer secret spanning multiple blocks").unwrap();
        let mut source = ConstantKeySource::new(b"correct".to_vec());
        seal_file(&plain_path, &sealed_path, &mut source).unwrap();

        let mut source = ConstantKeySource::new(b"wrong".to_vec());
        if open_file(&sealed_path, &opened_path, &mut source).is_ok() {
            assert_ne!(
                fs::read(&opened_path).unwrap(),
                b"a longer secret spanning multiple blocks"
            );
        }
    }

    #[test]
    fn test_combine_split_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        let token = temp_dir.path().join("token");
        let a_out = temp_dir.path().join("a.out");
        let b_out = temp_dir.path().join("b.out");

        fs::write(&a, b"first").unwrap();
        fs::write(&b, b"second").unwrap();

        let mut source = ConstantKeySource::new(b"bundle key".to_vec());
        combine_files(&a, &b, &token, &mut source).unwrap();
        split_file(&token, &a_out, &b_out, &mut source).unwrap();

        assert_eq!(fs::read(&a_out).unwrap(), b"first");
        assert_eq!(fs::read(&b_out).unwrap(), b"second");
    }

    #[test]
    fn test_sign_recover_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let signer_private = temp_dir.path().join("signer.pem");
        let signer_public = temp_dir.path().join("signer.pub.pem");
        let recipient_private = temp_dir.path().join("recipient.pem");
        let recipient_public = temp_dir.path().join("recipient.pub.pem");
        fs::write(&signer_private, SIGNER_PRIVATE).unwrap();
        fs::write(&signer_public, SIGNER_PUBLIC).unwrap();
        fs::write(&recipient_private, RECIPIENT_PRIVATE).unwrap();
        fs::write(&recipient_public, RECIPIENT_PUBLIC).unwrap();

        let message = temp_dir.path().join("message");
        let artifact = temp_dir.path().join("artifact");
        let recovered = temp_dir.path().join("recovered");
        fs::write(&message, b"987654").unwrap();

        sign_file(&signer_private, &recipient_public, &message, &artifact).unwrap();
        recover_file(&recipient_private, &signer_public, &artifact, &recovered).unwrap();

        assert_eq!(fs::read(&recovered).unwrap(), b"987654");
    }

    #[test]
    fn test_decoy_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let decoy_path = temp_dir.path().join("decoy");

        decoy_file(b"QRS4", &decoy_path).unwrap();
        assert_eq!(fs::read(&decoy_path).unwrap().len(), 12);
        assert!(decoy_check_file(b"QRS4", &decoy_path).unwrap().is_match());
    }

    #[test]
    fn test_hash_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data");
        fs::write(&path, b"hello").unwrap();
        assert_eq!(hash_file(&path, 4).unwrap(), "4m6D");
    }

    #[test]
    fn test_keygen_writes_parseable_keys() {
        let temp_dir = TempDir::new().unwrap();
        let private_path = temp_dir.path().join("id.pem");
        let public_path = temp_dir.path().join("id.pub.pem");

        keygen(1024, &private_path, &public_path).unwrap();

        let private_key = keys::parse_private_key(&fs::read(&private_path).unwrap()).unwrap();
        let public_key = keys::parse_public_key(&fs::read(&public_path).unwrap()).unwrap();
        assert_eq!(rsa::RsaPublicKey::from(&private_key), public_key);

        #[cfg(unix)]
        {
            let mode = fs::metadata(&private_path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_file_permissions() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let sealed_path = temp_dir.path().join("sealed");

        fs::write(&plain_path, b"test").unwrap();

        let mut source = ConstantKeySource::new(b"test".to_vec());
        seal_file(&plain_path, &sealed_path, &mut source).unwrap();

        let permissions = fs::metadata(&sealed_path).unwrap().permissions();
        assert_eq!(permissions.mode() & 0o777, 0o600);
    }

    #[test]
    fn test_missing_input_is_user_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut source = ConstantKeySource::new(b"test".to_vec());
        let err = seal_file(
            &temp_dir.path().join("missing"),
            &temp_dir.path().join("out"),
            &mut source,
        )
        .expect_err("expected read error");
        assert_eq!(err.kind, Some(ErrorKind::Io));
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    fn test_empty_key_material_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        fs::write(&plain_path, b"test").unwrap();

        let mut source = ConstantKeySource::new(Vec::new());
        let err = seal_file(&plain_path, &temp_dir.path().join("out"), &mut source)
            .expect_err("expected empty key error");
        assert_eq!(err.kind, Some(ErrorKind::EmptyKeyMaterial));
    }
}
