//! Class composition of a pixel window
//!
//! Two views of the same counts: a fixed six-class domain feeding the
//! per-class metrics, and the set of codes actually present feeding the
//! landscape-level metrics.

use std::collections::BTreeMap;
use std::fmt;

use landpattern_core::{ClassCode, Error, Result};
use serde::{Deserialize, Serialize};

use super::window::GridWindow;

/// The fixed land-cover domain (codes 1..=6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LandCoverClass {
    Cropland = 1,
    Forest = 2,
    Barren = 3,
    Grassland = 4,
    Water = 5,
    Impervious = 6,
}

impl LandCoverClass {
    pub const COUNT: usize = 6;

    pub const ALL: [LandCoverClass; 6] = [
        LandCoverClass::Cropland,
        LandCoverClass::Forest,
        LandCoverClass::Barren,
        LandCoverClass::Grassland,
        LandCoverClass::Water,
        LandCoverClass::Impervious,
    ];

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(LandCoverClass::Cropland),
            2 => Some(LandCoverClass::Forest),
            3 => Some(LandCoverClass::Barren),
            4 => Some(LandCoverClass::Grassland),
            5 => Some(LandCoverClass::Water),
            6 => Some(LandCoverClass::Impervious),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Zero-based slot in per-class arrays
    pub fn index(self) -> usize {
        self as usize - 1
    }

    pub fn name(self) -> &'static str {
        match self {
            LandCoverClass::Cropland => "cropland",
            LandCoverClass::Forest => "forest",
            LandCoverClass::Barren => "barren",
            LandCoverClass::Grassland => "grassland",
            LandCoverClass::Water => "water",
            LandCoverClass::Impervious => "impervious",
        }
    }
}

impl fmt::Display for LandCoverClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// How valid codes outside the fixed domain are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassDomainPolicy {
    /// Fail the raster with [`Error::MalformedClassDomain`]
    #[default]
    Strict,
    /// Count the pixel in the window total but in no class
    Lenient,
}

/// Pixel count and share of one class
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassStats {
    pub pixel_count: usize,
    /// `pixel_count / valid_pixels`
    pub area_fraction: f64,
}

/// Counts over the fixed six-class domain.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedComposition {
    stats: [ClassStats; LandCoverClass::COUNT],
    /// Pixels that are not nodata
    pub valid_pixels: usize,
    /// All pixels in the window
    pub total_pixels: usize,
    /// Valid pixels whose code is outside 1..=6 (lenient policy only)
    pub out_of_domain: usize,
}

impl FixedComposition {
    pub fn get(&self, class: LandCoverClass) -> ClassStats {
        self.stats[class.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (LandCoverClass, ClassStats)> + '_ {
        LandCoverClass::ALL.iter().map(|&c| (c, self.stats[c.index()]))
    }
}

/// Counts over the codes actually present, sorted by code.
///
/// Nodata never appears in `classes`.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition<T> {
    classes: Vec<(T, ClassStats)>,
    pub valid_pixels: usize,
    pub total_pixels: usize,
}

impl<T: ClassCode> Composition<T> {
    /// Number of distinct classes present (`m`)
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn codes(&self) -> Vec<T> {
        self.classes.iter().map(|(c, _)| *c).collect()
    }

    pub fn get(&self, code: T) -> Option<ClassStats> {
        self.index_of(code).map(|i| self.classes[i].1)
    }

    /// Position of `code` in sorted order
    pub fn index_of(&self, code: T) -> Option<usize> {
        self.classes.binary_search_by_key(&code, |(c, _)| *c).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(T, ClassStats)> {
        self.classes.iter()
    }

    /// Pixel count of the most abundant class
    pub fn largest_count(&self) -> usize {
        self.classes.iter().map(|(_, s)| s.pixel_count).max().unwrap_or(0)
    }
}

/// Count pixels per fixed class.
///
/// Under [`ClassDomainPolicy::Strict`] the first valid code outside 1..=6
/// aborts with [`Error::MalformedClassDomain`].
pub fn fixed_composition<T: ClassCode>(
    window: &GridWindow<'_, T>,
    policy: ClassDomainPolicy,
) -> Result<FixedComposition> {
    let mut counts = [0usize; LandCoverClass::COUNT];
    let mut valid = 0usize;
    let mut out_of_domain = 0usize;

    for &v in window.cells().iter() {
        if !window.is_valid(v) {
            continue;
        }
        valid += 1;
        match LandCoverClass::from_code(v.to_u32()) {
            Some(class) => counts[class.index()] += 1,
            None => match policy {
                ClassDomainPolicy::Strict => {
                    return Err(Error::MalformedClassDomain {
                        code: v.to_u32(),
                        max: LandCoverClass::COUNT as u32,
                    });
                }
                ClassDomainPolicy::Lenient => out_of_domain += 1,
            },
        }
    }

    let stats = counts.map(|pixel_count| ClassStats {
        pixel_count,
        area_fraction: fraction(pixel_count, valid),
    });

    Ok(FixedComposition {
        stats,
        valid_pixels: valid,
        total_pixels: window.pixel_count(),
        out_of_domain,
    })
}

/// Count pixels per distinct code present, excluding nodata
pub fn composition<T: ClassCode>(window: &GridWindow<'_, T>) -> Composition<T> {
    let counts = window
        .cells()
        .iter()
        .filter(|&&v| window.is_valid(v))
        .fold(BTreeMap::<T, usize>::new(), |mut acc, &v| {
            *acc.entry(v).or_insert(0) += 1;
            acc
        });

    let valid: usize = counts.values().sum();
    let classes = counts
        .into_iter()
        .map(|(code, pixel_count)| {
            (
                code,
                ClassStats {
                    pixel_count,
                    area_fraction: fraction(pixel_count, valid),
                },
            )
        })
        .collect();

    Composition {
        classes,
        valid_pixels: valid,
        total_pixels: window.pixel_count(),
    }
}

fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landscape::window::extract_window;
    use approx::assert_relative_eq;
    use landpattern_core::{Bounds, GeoTransform, Raster};

    fn raster(data: Vec<u8>, rows: usize, cols: usize) -> Raster<u8> {
        Raster::from_vec(data, rows, cols)
            .unwrap()
            .with_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0))
            .with_nodata(255)
    }

    fn full(r: &Raster<u8>) -> Bounds {
        Bounds::new(0.0, 0.0, r.cols() as f64, r.rows() as f64)
    }

    #[test]
    fn test_class_codes() {
        for (i, class) in LandCoverClass::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
            assert_eq!(LandCoverClass::from_code(class.code()), Some(*class));
        }
        assert_eq!(LandCoverClass::from_code(0), None);
        assert_eq!(LandCoverClass::from_code(7), None);
        assert_eq!(LandCoverClass::Water.name(), "water");
    }

    #[test]
    fn test_fixed_composition_counts() {
        let r = raster(vec![1, 1, 2, 255, 6, 6, 6, 3, 255], 3, 3);
        let w = extract_window(&r, &full(&r), 255).unwrap();
        let comp = fixed_composition(&w, ClassDomainPolicy::Strict).unwrap();

        assert_eq!(comp.total_pixels, 9);
        assert_eq!(comp.valid_pixels, 7);
        assert_eq!(comp.get(LandCoverClass::Cropland).pixel_count, 2);
        assert_eq!(comp.get(LandCoverClass::Impervious).pixel_count, 3);
        assert_eq!(comp.get(LandCoverClass::Water).pixel_count, 0);
        assert_relative_eq!(comp.get(LandCoverClass::Impervious).area_fraction, 3.0 / 7.0);

        let sum: usize = comp.iter().map(|(_, s)| s.pixel_count).sum();
        assert_eq!(sum, comp.valid_pixels);
    }

    #[test]
    fn test_out_of_domain_strict() {
        let r = raster(vec![1, 9, 2, 2], 2, 2);
        let w = extract_window(&r, &full(&r), 255).unwrap();
        let err = fixed_composition(&w, ClassDomainPolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::MalformedClassDomain { code: 9, max: 6 }));
    }

    #[test]
    fn test_out_of_domain_lenient() {
        let r = raster(vec![1, 9, 2, 2], 2, 2);
        let w = extract_window(&r, &full(&r), 255).unwrap();
        let comp = fixed_composition(&w, ClassDomainPolicy::Lenient).unwrap();
        assert_eq!(comp.out_of_domain, 1);
        assert_eq!(comp.valid_pixels, 4);
        assert_relative_eq!(comp.get(LandCoverClass::Forest).area_fraction, 0.5);
    }

    #[test]
    fn test_dynamic_composition_excludes_nodata() {
        let r = raster(vec![4, 4, 255, 1, 4, 2], 2, 3);
        let w = extract_window(&r, &full(&r), 255).unwrap();
        let comp = composition(&w);

        assert_eq!(comp.codes(), vec![1, 2, 4]);
        assert_eq!(comp.len(), 3);
        assert_eq!(comp.valid_pixels, 5);
        assert_eq!(comp.total_pixels, 6);
        assert_eq!(comp.index_of(4), Some(2));
        assert_eq!(comp.index_of(255), None);
        assert_eq!(comp.largest_count(), 3);
        assert_relative_eq!(comp.get(4).unwrap().area_fraction, 0.6);

        let total: f64 = comp.iter().map(|(_, s)| s.area_fraction).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }
}
