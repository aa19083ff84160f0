//! Class code trait for categorical raster cells

use num_traits::{NumCast, Zero};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait for unsigned integer types that can hold land-cover class codes.
///
/// Class rasters are categorical, so codes are compared for equality and
/// ordered only to give deterministic iteration over observed classes.
pub trait ClassCode:
    Copy + Debug + Display + Eq + Ord + Hash + NumCast + Zero + Send + Sync + 'static
{
    /// Default no-data value for this type (the type maximum, 255 for `u8`)
    fn default_nodata() -> Self;

    /// Widen to `u32` for domain checks and reporting
    fn to_u32(self) -> u32;

    /// Check if this value represents no-data
    fn is_nodata(&self, nodata: Option<Self>) -> bool {
        match nodata {
            Some(nd) => *self == nd,
            None => false,
        }
    }
}

macro_rules! impl_class_code {
    ($t:ty) => {
        impl ClassCode for $t {
            fn default_nodata() -> Self {
                <$t>::MAX
            }

            fn to_u32(self) -> u32 {
                self as u32
            }
        }
    };
}

impl_class_code!(u8);
impl_class_code!(u16);
impl_class_code!(u32);
