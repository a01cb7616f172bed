// SPDX-License-Identifier: MIT

use std::io::{Read, Write};

use muxfs::core::errors::{MuxError, VolumeError};
use muxfs::fat::{FatVolume, format_volume};
use muxfs::{BackendConfig, FsVolume, MountTable, Volume, VolumeMux, VolumeRegistry, truncate_head};
use muxio::prelude::*;

const RAM_BYTES: usize = 2 * 1024 * 1024;

#[test]
fn test_sdram_through_mux() {
    let config = BackendConfig::builder()
        .usb(true)
        .sdram(true)
        .build()
        .expect("config");
    let registry = VolumeRegistry::new(&config);

    let mut ram = vec![0u8; RAM_BYTES];
    let mut ram_disk = MemDisk::new(&mut ram);

    let mut backends = VolumeMux::new(registry);
    backends.attach("SDRAM", &mut ram_disk).expect("attach");
    backends.initialize("SDRAM").expect("initialize");

    let handle = backends.device("SDRAM").expect("device");
    let mut stream = DiskStream::new(handle).expect("stream");
    format_volume(&mut stream).expect("format");

    let volume = FatVolume::mount(stream).expect("mount");
    let mut table = MountTable::new(registry);
    table.mount("SDRAM", volume).expect("mount table");

    let size = table.drive_size("2").expect("drive size");
    assert!(size.total() > 0);
    assert!(size.free() <= size.total());
    assert!(size.total() <= RAM_BYTES as u64);
    assert_eq!(table.drive_size("SDRAM:").expect("prefixed"), size);

    assert!(matches!(
        table.drive_size("USB"),
        Err(MuxError::Volume(VolumeError::NotMounted(Volume::Usb)))
    ));
    assert!(matches!(
        table.drive_size("SPIFLASH"),
        Err(MuxError::Volume(VolumeError::BackendDisabled(Volume::SpiFlash)))
    ));
}

#[test]
fn test_free_space_drops_after_write() {
    let mut ram = vec![0u8; RAM_BYTES];
    let mut disk = MemDisk::new(&mut ram);
    disk.initialize().expect("initialize");
    let mut stream = DiskStream::new(&mut disk).expect("stream");
    format_volume(&mut stream).expect("format");

    let volume = FatVolume::mount(stream).expect("mount");
    let before = volume.geometry().expect("geometry").drive_size();
    {
        let mut file = volume.create_file("big.bin").expect("create");
        file.write_all(&vec![0xAB; 64 * 1024]).expect("write");
    }
    let after = volume.geometry().expect("geometry").drive_size();

    assert_eq!(before.total(), after.total());
    assert!(after.free() + 64 * 1024 <= before.free());
    assert!(after.free() <= after.total());
}

#[test]
fn test_usb_image_on_disk() {
    let config = BackendConfig::builder().usb(true).build().expect("config");
    let registry = VolumeRegistry::new(&config);

    let mut image = tempfile::tempfile().expect("tempfile");
    image.set_len(RAM_BYTES as u64).expect("set_len");
    let mut usb = StdDisk::new(&mut image).expect("disk");

    let mut backends = VolumeMux::new(registry);
    backends.attach("USB", &mut usb).expect("attach");
    backends.initialize("1").expect("initialize");

    let mut stream = DiskStream::new(backends.device("USB").expect("device")).expect("stream");
    format_volume(&mut stream).expect("format");
    let volume = FatVolume::mount(fscommon::BufStream::new(stream)).expect("mount");

    {
        let mut file = volume.create_file("a.txt").expect("create");
        file.write_all(b"hello, usb").expect("write");
    }
    let mut out = String::new();
    volume
        .open_file("a.txt")
        .expect("open")
        .read_to_string(&mut out)
        .expect("read");
    assert_eq!(out, "hello, usb");
    volume.unmount().expect("unmount");
}

#[test]
fn test_write_protected_card_cannot_format() {
    let mut image = tempfile::tempfile().expect("tempfile");
    image.set_len(RAM_BYTES as u64).expect("set_len");
    let mut sd = StdDisk::new(&mut image).expect("disk").read_only(true);

    let config = BackendConfig::default();
    let mut backends = VolumeMux::new(VolumeRegistry::new(&config));
    backends.attach("SD", &mut sd).expect("attach");
    let status = backends.initialize("SD").expect("initialize");
    assert!(status.contains(DiskStatus::PROTECT));

    let mut stream = DiskStream::new(backends.device("0").expect("device")).expect("stream");
    assert!(format_volume(&mut stream).is_err());
    drop(stream);

    assert!(image.metadata().expect("metadata").len() == RAM_BYTES as u64);
}

#[test]
fn test_truncate_keeps_other_files() {
    let mut ram = vec![0u8; RAM_BYTES];
    let mut disk = MemDisk::new(&mut ram);
    disk.initialize().expect("initialize");
    let mut stream = DiskStream::new(&mut disk).expect("stream");
    format_volume(&mut stream).expect("format");
    let volume = FatVolume::mount(stream).expect("mount");

    let keep: Vec<u8> = (0..3000u32).map(|i| (i % 97) as u8).collect();
    let log: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
    volume
        .create_file("keep.bin")
        .expect("create")
        .write_all(&keep)
        .expect("write");
    {
        let mut file = volume.create_file("log.bin").expect("create");
        file.write_all(&log).expect("write");
        truncate_head(&mut file, 1234).expect("truncate");
    }

    let mut out = Vec::new();
    volume
        .open_file("log.bin")
        .expect("open")
        .read_to_end(&mut out)
        .expect("read");
    assert_eq!(out, &log[1234..]);

    out.clear();
    volume
        .open_file("keep.bin")
        .expect("open")
        .read_to_end(&mut out)
        .expect("read");
    assert_eq!(out, keep);
}
