// File-level entry points for patch application.
//
// Two invocation modes converge on `engine::apply`: reading the three
// inputs from named files in a directory, or extracting them from an
// OTA zip. All inputs are held fully in memory; the output goes through
// a `BufWriter`.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use log::{debug, info};

use crate::engine::{self, ApplyStats};
use crate::error::ApplyError;

/// Source image file name inside a patch directory.
pub const SOURCE_NAME: &str = "boot.img";
/// Patch stream file name inside a patch directory.
pub const PATCH_NAME: &str = "recovery-from-boot.p";
/// Optional bonus data file name inside a patch directory.
pub const BONUS_NAME: &str = "recovery-resource.dat";

/// Source image entry inside an OTA archive.
pub const OTA_SOURCE_ENTRY: &str = "boot.img";
/// Patch stream entry inside an OTA archive.
pub const OTA_PATCH_ENTRY: &str = "recovery/recovery-from-boot.p";

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Directory mode
// ---------------------------------------------------------------------------

/// Apply a patch from a directory holding `boot.img`,
/// `recovery-from-boot.p` and, optionally, `recovery-resource.dat`.
pub fn apply_from_dir(dir: &Path, output_path: &Path) -> Result<ApplyStats, ApplyError> {
    let source = std::fs::read(dir.join(SOURCE_NAME))?;
    let patch = std::fs::read(dir.join(PATCH_NAME))?;

    let bonus_path = dir.join(BONUS_NAME);
    let bonus = if bonus_path.is_file() {
        debug!("bonus data: {}", bonus_path.display());
        Some(std::fs::read(&bonus_path)?)
    } else {
        None
    };

    info!(
        "applying {} ({} bytes) from {}",
        PATCH_NAME,
        patch.len(),
        dir.display()
    );
    write_output(output_path, &source, &patch, bonus.as_deref())
}

// ---------------------------------------------------------------------------
// OTA archive mode
// ---------------------------------------------------------------------------

/// Apply a patch extracted from an OTA zip archive.
///
/// The archive must contain `boot.img` and
/// `recovery/recovery-from-boot.p`; this mode carries no bonus data.
pub fn apply_from_ota(ota_path: &Path, output_path: &Path) -> Result<ApplyStats, ApplyError> {
    let file = File::open(ota_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let source = read_entry(&mut archive, OTA_SOURCE_ENTRY)?;
    let patch = read_entry(&mut archive, OTA_PATCH_ENTRY)?;

    info!(
        "applying {} ({} bytes) from {}",
        OTA_PATCH_ENTRY,
        patch.len(),
        ota_path.display()
    );
    write_output(output_path, &source, &patch, None)
}

fn read_entry<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, ApplyError> {
    let mut entry = archive.by_name(name)?;
    let mut data = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut data)?;
    debug!("extracted {name}: {} bytes", data.len());
    Ok(data)
}

// ---------------------------------------------------------------------------
// Shared output path
// ---------------------------------------------------------------------------

fn write_output(
    output_path: &Path,
    source: &[u8],
    patch: &[u8],
    bonus: Option<&[u8]>,
) -> Result<ApplyStats, ApplyError> {
    let output_file = File::create(output_path)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, output_file);
    let stats = engine::apply(source, patch, bonus, &mut writer)?;
    writer.flush()?;
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
