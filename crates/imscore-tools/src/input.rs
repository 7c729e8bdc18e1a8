use std::fs::File;
use std::io::{Read, stdin};
use std::path::{Path, PathBuf};

use anyhow::Context;
use flate2::read::GzDecoder;

/// Read VGM bytes from a path or stdin ('-') into a `Vec<u8>`.
///
/// Files with a `.vgz` extension are decompressed; for stdin, gzipped
/// content is detected via the gzip magic bytes (0x1F 0x8B) and
/// decompressed automatically.
pub fn read_vgm_as_vec(path: &PathBuf) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut raw = Vec::new();
        stdin()
            .read_to_end(&mut raw)
            .context("failed to read from stdin")?;
        if raw.starts_with(&[0x1F, 0x8B]) {
            return gunzip(&raw[..]).context("failed to decompress gzip data from stdin");
        }
        return Ok(raw);
    }

    let mut file =
        File::open(path).with_context(|| format!("failed to open input file: {}", path.display()))?;

    let is_vgz = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("vgz"));

    if is_vgz {
        gunzip(file).context("failed to decompress .vgz input")
    } else {
        let mut raw = Vec::new();
        file.read_to_end(&mut raw)
            .context("failed to read input file")?;
        Ok(raw)
    }
}

fn gunzip<R: Read>(reader: R) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(reader).read_to_end(&mut out)?;
    Ok(out)
}
