// SPDX-License-Identifier: MIT

/// Wires layer errors into the generic top-level error.
///
/// - `top`: each listed error converts into `Top::<Variant>` for any engine error `E`
/// - `str_into`: `&'static str` converts into `Other(msg)` of each listed error
#[macro_export]
macro_rules! mux_error_wiring {
    (
        top => $top:ident {
            $($top_src:ty : $top_variant:ident),+ $(,)?
        },
        str_into => [ $($str_tgt:ty),* $(,)? ] $(,)?
    ) => {
        $(
            impl<E> From<$top_src> for $top<E> {
                #[inline]
                fn from(e: $top_src) -> Self { $top::$top_variant(e) }
            }
        )+

        $(
            impl From<&'static str> for $str_tgt {
                #[inline]
                fn from(msg: &'static str) -> Self { <$str_tgt>::Other(msg) }
            }
        )*
    };
}

/// Generates the volume table: the `Volume` enum, one token and drive
/// constant per volume, and the token lookups.
///
/// Each volume resolves from its name token and from the decimal spelling of
/// its drive index.
#[macro_export]
macro_rules! define_volumes {
    (
        $(
            $name:ident => $token:literal, $drive:literal, $desc:literal
        ),+ $(,)?
    ) => {
        paste::paste! {
            $(
                #[doc = concat!("Token of the ", $desc, " volume.")]
                pub const [<VOLUME_TOKEN_ $name:upper>]: &str = $token;

                #[doc = concat!("Drive index of the ", $desc, " volume.")]
                pub const [<DRIVE_ $name:upper>]: DriveIndex = DriveIndex($drive);
            )+

            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub enum Volume {
                $(#[doc = $desc] $name,)+
            }

            impl Volume {
                /// Every volume, in drive index order.
                pub const ALL: &'static [Volume] = &[$(Volume::$name,)+];

                /// Canonical name token.
                pub const fn token(&self) -> &'static str {
                    match self {
                        $(Volume::$name => $token,)+
                    }
                }

                pub const fn drive(&self) -> DriveIndex {
                    match self {
                        $(Volume::$name => DriveIndex($drive),)+
                    }
                }

                pub const fn description(&self) -> &'static str {
                    match self {
                        $(Volume::$name => $desc,)+
                    }
                }

                pub fn from_drive(drive: DriveIndex) -> Option<Volume> {
                    $(
                        if drive.get() == $drive {
                            return Some(Volume::$name);
                        }
                    )+
                    None
                }

                /// Case-sensitive lookup of a name or numeric token.
                pub fn from_token(token: &str) -> Option<Volume> {
                    $(
                        if token == $token || token == stringify!($drive) {
                            return Some(Volume::$name);
                        }
                    )+
                    None
                }
            }

            impl core::fmt::Display for Volume {
                fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                    f.write_str(self.token())
                }
            }
        }
    };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}
