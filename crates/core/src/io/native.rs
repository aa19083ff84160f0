//! Native GeoTIFF reading for class rasters
//!
//! Uses the `tiff` crate. Reads the pixel grid plus the GeoTIFF tags needed
//! for zonal metrics: ModelPixelScale/ModelTiepoint (or ModelTransformation),
//! GDAL_NODATA and the EPSG code from the GeoKeyDirectory.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{ClassCode, GeoTransform, Raster};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

const GEOGRAPHIC_TYPE_KEY: u32 = 2048;
const PROJECTED_CS_TYPE_KEY: u32 = 3072;

/// Canonical `Tag` for a numeric GeoTIFF tag id, whether or not the `tiff`
/// crate names it.
fn geo_tag(id: u16) -> Tag {
    Tag::from_u16_exhaustive(id)
}

/// Read one band of a GeoTIFF as a class raster.
///
/// `band` is 1-based; `None` reads the first band. Float pixels are rounded
/// to the nearest code and NaN becomes the nodata sentinel.
pub fn read_class_raster<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: ClassCode,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_class_raster(BufReader::new(file), band)
}

/// Read a GeoTIFF class raster from an in-memory buffer
pub fn read_class_raster_from_buffer<T>(data: &[u8], band: Option<usize>) -> Result<Raster<T>>
where
    T: ClassCode,
{
    decode_class_raster(Cursor::new(data), band)
}

fn tiff_err(what: &str) -> impl FnOnce(tiff::TiffError) -> Error + '_ {
    move |e| Error::Other(format!("{}: {}", what, e))
}

fn decode_class_raster<T, R>(reader: R, band: Option<usize>) -> Result<Raster<T>>
where
    T: ClassCode,
    R: std::io::Read + std::io::Seek,
{
    let mut decoder = Decoder::new(reader).map_err(tiff_err("TIFF decode error"))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(tiff_err("Cannot read dimensions"))?;
    let rows = height as usize;
    let cols = width as usize;

    // Tags first: read_image does not need them, but nodata drives conversion
    let nodata_tag = read_nodata(&mut decoder);
    let transform = read_geotransform(&mut decoder);
    let crs = read_crs(&mut decoder);

    let nodata: T = match nodata_tag {
        Some(v) if v.is_finite() && v.fract() == 0.0 => {
            num_traits::cast(v).unwrap_or_else(T::default_nodata)
        }
        _ => T::default_nodata(),
    };

    let result = decoder
        .read_image()
        .map_err(tiff_err("Cannot read image data"))?;

    let samples: Vec<T> = match result {
        DecodingResult::U8(buf) => cast_codes(&buf, nodata),
        DecodingResult::U16(buf) => cast_codes(&buf, nodata),
        DecodingResult::U32(buf) => cast_codes(&buf, nodata),
        DecodingResult::U64(buf) => cast_codes(&buf, nodata),
        DecodingResult::I8(buf) => cast_codes(&buf, nodata),
        DecodingResult::I16(buf) => cast_codes(&buf, nodata),
        DecodingResult::I32(buf) => cast_codes(&buf, nodata),
        DecodingResult::I64(buf) => cast_codes(&buf, nodata),
        DecodingResult::F32(buf) => buf
            .iter()
            .map(|&v| float_code(f64::from(v), nodata))
            .collect(),
        DecodingResult::F64(buf) => buf.iter().map(|&v| float_code(v, nodata)).collect(),
    };

    let cells = rows * cols;
    if cells == 0 || samples.len() % cells != 0 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let bands = samples.len() / cells;
    let band = band.unwrap_or(1);
    if band == 0 || band > bands {
        return Err(Error::InvalidParameter {
            name: "band",
            value: band.to_string(),
            reason: format!("image has {} band(s)", bands),
        });
    }

    let data: Vec<T> = if bands == 1 {
        samples
    } else {
        samples.into_iter().skip(band - 1).step_by(bands).collect()
    };

    let mut raster = Raster::from_vec(data, rows, cols)?;
    raster.set_nodata(Some(nodata));
    raster.set_crs(crs);
    if let Some(transform) = transform {
        raster.set_transform(transform);
    }

    tracing::debug!(
        rows,
        cols,
        bands,
        nodata = %nodata,
        crs = %raster.crs().map(|c| c.identifier()).unwrap_or_else(|| "none".into()),
        "decoded class raster"
    );

    Ok(raster)
}

fn cast_codes<S, T>(buf: &[S], nodata: T) -> Vec<T>
where
    S: num_traits::NumCast + Copy,
    T: ClassCode,
{
    buf.iter()
        .map(|&v| num_traits::cast(v).unwrap_or(nodata))
        .collect()
}

fn float_code<T: ClassCode>(v: f64, nodata: T) -> T {
    if v.is_nan() {
        return nodata;
    }
    num_traits::cast(v.round()).unwrap_or(nodata)
}

/// GDAL_NODATA is an ASCII tag, often NUL-terminated
fn read_nodata<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let s = decoder
        .get_tag_ascii_string(geo_tag(GDAL_NODATA))
        .ok()?;
    s.trim_end_matches('\0').trim().parse::<f64>().ok()
}

fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Option<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(geo_tag(MODEL_PIXEL_SCALE))
        .ok();
    let tiepoint = decoder.get_tag_f64_vec(geo_tag(MODEL_TIEPOINT)).ok();

    if let (Some(scale), Some(tiepoint)) = (scale, tiepoint) {
        if scale.len() >= 2 && tiepoint.len() >= 6 {
            // tiepoint: [I, J, K, X, Y, Z]; scale: [ScaleX, ScaleY, ScaleZ]
            let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
            let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
            return Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
        }
    }

    // Row-major 4x4 matrix
    let t = decoder
        .get_tag_f64_vec(geo_tag(MODEL_TRANSFORMATION))
        .ok()?;
    (t.len() >= 16).then(|| GeoTransform {
        origin_x: t[3],
        origin_y: t[7],
        pixel_width: t[0],
        pixel_height: t[5],
        row_rotation: t[1],
        col_rotation: t[4],
    })
}

/// EPSG code from ProjectedCSTypeGeoKey, falling back to GeographicTypeGeoKey
fn read_crs<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<CRS> {
    let keys = decoder
        .get_tag_u32_vec(geo_tag(GEO_KEY_DIRECTORY))
        .ok()?;
    if keys.len() < 4 {
        return None;
    }

    // Header: [version, revision, minor, count], then 4 shorts per key
    let entries: Vec<&[u32]> = keys[4..].chunks_exact(4).take(keys[3] as usize).collect();
    let lookup = |id: u32| {
        entries
            .iter()
            .find(|e| e[0] == id && e[1] == 0 && e[3] > 0 && e[3] < 32767)
            .map(|e| e[3])
    };

    lookup(PROJECTED_CS_TYPE_KEY)
        .or_else(|| lookup(GEOGRAPHIC_TYPE_KEY))
        .map(CRS::from_epsg)
}
