// SPDX-License-Identifier: MIT

use anyhow::{Context, bail};
use colored::Colorize;
use log::{debug, info, warn};
use std::fs::{File, OpenOptions};
use std::path::Path;

use muxfs::fat::{FatVolume, format_volume, stamp_modified};
use muxfs::{
    CardSensor, FsFile, MountTable, SdCard, Volume, VolumeMux, VolumeRegistry, now_fat_timestamp,
    truncate_head_sized,
};
use muxio::prelude::*;

use crate::config::ToolConfig;
use crate::utils::pretty_bytes;

pub fn resolve(config: &ToolConfig, token: &str) -> anyhow::Result<()> {
    let registry = VolumeRegistry::new(config.backends());
    if token.contains(':') {
        let (volume, path) = registry.resolve_path(token)?;
        println!("{} {path}", volume.drive());
    } else {
        println!("{}", registry.resolve(token)?);
    }
    Ok(())
}

pub fn volumes(config: &ToolConfig) -> anyhow::Result<()> {
    for &volume in Volume::ALL {
        let enabled = config.backends().is_enabled(volume);
        let state = if !enabled {
            "disabled".dimmed().to_string()
        } else {
            match with_volume(config, volume, |dev| Ok(dev.status())) {
                Ok(status) if status.is_writable() => "ready".green().to_string(),
                Ok(status) if status.is_ready() => "read-only".yellow().to_string(),
                Ok(status) => format!("{status:?}").yellow().to_string(),
                Err(e) => format!("unavailable ({e})").red().to_string(),
            }
        };
        println!(
            "{:>8}  {}  {:<18}  {state}",
            volume.token().bold(),
            volume.drive(),
            volume.description()
        );
    }
    Ok(())
}

pub fn size(config: &ToolConfig, token: &str) -> anyhow::Result<()> {
    let registry = VolumeRegistry::new(config.backends());
    let volume = registry.resolve_prefix(token)?;

    let size = with_volume(config, volume, |dev| {
        let mut table = MountTable::new(registry);
        table.mount(volume.token(), FatVolume::mount(DiskStream::new(dev)?)?)?;
        Ok(table.drive_size(volume.token())?)
    })?;

    println!(
        "{volume}: {} total, {} free ({} used)",
        pretty_bytes(size.total()),
        pretty_bytes(size.free()),
        pretty_bytes(size.used())
    );
    Ok(())
}

pub fn truncate(config: &ToolConfig, target: &str, count: u64) -> anyhow::Result<()> {
    let registry = VolumeRegistry::new(config.backends());
    let (volume, path) = registry.resolve_path(target)?;
    if path.is_empty() {
        bail!("missing file path after '{volume}:'");
    }
    let capacity = config.backends().truncate_buffer_size();

    let (before, after) = with_volume(config, volume, |dev| {
        let fat = FatVolume::mount(DiskStream::new(dev)?)?;
        let mut file = fat
            .open_file(path)
            .with_context(|| format!("opening {volume}:{path}"))?;
        let before = file.size()?;
        truncate_head_sized(&mut file, count, capacity)?;
        stamp_modified(&mut file, now_fat_timestamp());
        let after = file.size()?;
        drop(file);
        fat.unmount()?;
        Ok((before, after))
    })?;

    info!("{volume}:{path}: {before} -> {after} bytes (buffer {capacity})");
    Ok(())
}

pub fn format(config: &ToolConfig, token: &str, create: Option<u64>) -> anyhow::Result<()> {
    let registry = VolumeRegistry::new(config.backends());
    let volume = registry.resolve_prefix(token)?;

    if let Some(len) = create {
        let image = config.image(volume)?;
        create_image(&image, len)?;
    }

    with_volume(config, volume, |dev| {
        let mut stream = DiskStream::new(dev)?;
        format_volume(&mut stream)?;
        Ok(())
    })?;
    info!("{volume}: formatted");
    Ok(())
}

fn create_image(path: &Path, len: u64) -> anyhow::Result<()> {
    if path.exists() {
        warn!("{} already exists, keeping its size", path.display());
        return Ok(());
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    file.set_len(len)?;
    info!("created {} ({})", path.display(), pretty_bytes(len));
    Ok(())
}

fn open_image(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .with_context(|| format!("opening image {}", path.display()))
}

/// Brings up the medium behind `volume` and runs `f` on its block device.
///
/// SD and USB are backed by image files. SDRAM is volatile and gets a fresh
/// RAM disk with a new filesystem on every call.
pub fn with_volume<R>(
    config: &ToolConfig,
    volume: Volume,
    f: impl FnOnce(DriveHandle<'_, '_>) -> anyhow::Result<R>,
) -> anyhow::Result<R> {
    let registry = VolumeRegistry::new(config.backends());
    registry.resolve_volume(volume.token())?;

    match volume {
        Volume::Sd => {
            let mut image = open_image(&config.image(volume)?)?;
            if config.backends().has_card_detect() || config.backends().has_write_protect() {
                debug!("slot pins are not wired on the host, card assumed present");
            }
            let mut card = SdCard::new(StdDisk::new(&mut image)?, CardSensor::disabled());
            run_attached(registry, volume, &mut card, f)
        }
        Volume::Usb => {
            let mut image = open_image(&config.image(volume)?)?;
            let mut disk = StdDisk::new(&mut image)?;
            run_attached(registry, volume, &mut disk, f)
        }
        Volume::Sdram => {
            let mut ram = vec![0u8; config.sdram_bytes()];
            let mut disk = MemDisk::new(&mut ram);
            run_attached(registry, volume, &mut disk, |mut dev| {
                format_volume(&mut DiskStream::new(&mut dev)?)?;
                debug!("{volume}: fresh RAM disk formatted");
                f(dev)
            })
        }
        Volume::SpiFlash => bail!("{volume}: no driver for this medium"),
    }
}

fn run_attached<'d, R>(
    registry: VolumeRegistry<'_>,
    volume: Volume,
    device: &'d mut (dyn BlockDevice + 'd),
    f: impl FnOnce(DriveHandle<'_, 'd>) -> anyhow::Result<R>,
) -> anyhow::Result<R> {
    let mut backends = VolumeMux::new(registry);
    backends.attach(volume.token(), device)?;
    let status = backends.initialize(volume.token())?;
    debug!("{volume}: status {status:?}");
    f(backends.device(volume.token())?)
}
