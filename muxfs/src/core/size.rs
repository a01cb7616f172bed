// SPDX-License-Identifier: MIT

//! Drive size computation.
//!
//! The engine reports clusters; callers want bytes. All products are taken in
//! `u64`, which covers 32-bit cluster counts times any legal cluster size.

/// Cluster counts and layout of a mounted volume, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClusterGeometry {
    pub total_clusters: u32,
    pub free_clusters: u32,
    pub sectors_per_cluster: u32,
    pub bytes_per_sector: u32,
}

impl ClusterGeometry {
    #[inline]
    pub const fn cluster_bytes(&self) -> u64 {
        self.sectors_per_cluster as u64 * self.bytes_per_sector as u64
    }

    /// Free space never exceeds total space, even if the engine's free count
    /// is stale.
    pub const fn drive_size(&self) -> DriveSize {
        let cluster = self.cluster_bytes();
        let total = self.total_clusters as u64 * cluster;
        let free = self.free_clusters as u64 * cluster;
        DriveSize {
            total,
            free: if free > total { total } else { free },
        }
    }
}

impl From<ClusterGeometry> for DriveSize {
    #[inline]
    fn from(g: ClusterGeometry) -> Self {
        g.drive_size()
    }
}

/// Total and free bytes of a volume. Computed per query, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveSize {
    total: u64,
    free: u64,
}

impl DriveSize {
    #[inline]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[inline]
    pub const fn free(&self) -> u64 {
        self.free
    }

    #[inline]
    pub const fn used(&self) -> u64 {
        self.total - self.free
    }

    #[inline]
    pub const fn total_kib(&self) -> u64 {
        self.total / 1024
    }

    #[inline]
    pub const fn free_kib(&self) -> u64 {
        self.free / 1024
    }
}

impl core::fmt::Display for DriveSize {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} KiB total, {} KiB free",
            self.total_kib(),
            self.free_kib()
        )
    }
}

/// A mounted engine volume that can report its cluster geometry.
pub trait FsVolume {
    type Error;

    fn geometry(&self) -> Result<ClusterGeometry, Self::Error>;
}

impl<V: FsVolume + ?Sized> FsVolume for &V {
    type Error = V::Error;

    #[inline]
    fn geometry(&self) -> Result<ClusterGeometry, Self::Error> {
        (**self).geometry()
    }
}
