/*!
Reading and writing [`Dataset`]s as NetCDF files, and the file level
operations built on top: converting ICON grid files to UGRID and opening UGRID
grids and datasets.
*/

use std::{
    fs,
    path::{Path, PathBuf},
};

use netcdf::{
    AttributeValue,
    types::{FloatType, IntType, NcVariableType},
};
use tracing::{debug, info, warn};

use crate::{
    dataset::{AttrValue, Dataset, Values, Variable},
    error::Error,
    grid::Grid,
    normalize::UgridConverter,
    prune::UxDataset,
};

fn from_netcdf_attr(name: &str, value: AttributeValue) -> Result<AttrValue, Error> {
    Ok(match value {
        AttributeValue::Longlong(v) => AttrValue::Int(v),
        AttributeValue::Double(v) => AttrValue::Double(v),
        AttributeValue::Str(v) => AttrValue::Str(v),
        AttributeValue::Longlongs(v) => AttrValue::Ints(v),
        AttributeValue::Doubles(v) => AttrValue::Doubles(v),
        AttributeValue::Strs(v) => AttrValue::Strs(v),
        AttributeValue::Schar(v) => AttrValue::Numbers(Values::I8(vec![v])),
        AttributeValue::Uchar(v) => AttrValue::Numbers(Values::U8(vec![v])),
        AttributeValue::Short(v) => AttrValue::Numbers(Values::I16(vec![v])),
        AttributeValue::Ushort(v) => AttrValue::Numbers(Values::U16(vec![v])),
        AttributeValue::Int(v) => AttrValue::Numbers(Values::I32(vec![v])),
        AttributeValue::Uint(v) => AttrValue::Numbers(Values::U32(vec![v])),
        AttributeValue::Ulonglong(v) => AttrValue::Numbers(Values::U64(vec![v])),
        AttributeValue::Float(v) => AttrValue::Numbers(Values::F32(vec![v])),
        AttributeValue::Schars(v) => AttrValue::Numbers(Values::I8(v)),
        AttributeValue::Uchars(v) => AttrValue::Numbers(Values::U8(v)),
        AttributeValue::Shorts(v) => AttrValue::Numbers(Values::I16(v)),
        AttributeValue::Ushorts(v) => AttrValue::Numbers(Values::U16(v)),
        AttributeValue::Ints(v) => AttrValue::Numbers(Values::I32(v)),
        AttributeValue::Uints(v) => AttrValue::Numbers(Values::U32(v)),
        AttributeValue::Ulonglongs(v) => AttrValue::Numbers(Values::U64(v)),
        AttributeValue::Floats(v) => AttrValue::Numbers(Values::F32(v)),
        #[allow(unreachable_patterns)]
        _ => return Err(Error::UnsupportedAttribute(name.to_string())),
    })
}

/// Attributes read as a single value are written back as a single value.
fn to_netcdf_attr(value: &AttrValue) -> AttributeValue {
    match value {
        AttrValue::Int(v) => AttributeValue::Longlong(*v),
        AttrValue::Double(v) => AttributeValue::Double(*v),
        AttrValue::Str(v) => AttributeValue::Str(v.clone()),
        AttrValue::Ints(v) => AttributeValue::Longlongs(v.clone()),
        AttrValue::Doubles(v) => AttributeValue::Doubles(v.clone()),
        AttrValue::Strs(v) => AttributeValue::Strs(v.clone()),
        AttrValue::Numbers(values) => match values {
            Values::I8(v) if v.len() == 1 => AttributeValue::Schar(v[0]),
            Values::U8(v) if v.len() == 1 => AttributeValue::Uchar(v[0]),
            Values::I16(v) if v.len() == 1 => AttributeValue::Short(v[0]),
            Values::U16(v) if v.len() == 1 => AttributeValue::Ushort(v[0]),
            Values::I32(v) if v.len() == 1 => AttributeValue::Int(v[0]),
            Values::U32(v) if v.len() == 1 => AttributeValue::Uint(v[0]),
            Values::I64(v) if v.len() == 1 => AttributeValue::Longlong(v[0]),
            Values::U64(v) if v.len() == 1 => AttributeValue::Ulonglong(v[0]),
            Values::F32(v) if v.len() == 1 => AttributeValue::Float(v[0]),
            Values::F64(v) if v.len() == 1 => AttributeValue::Double(v[0]),
            Values::I8(v) => AttributeValue::Schars(v.clone()),
            Values::U8(v) => AttributeValue::Uchars(v.clone()),
            Values::I16(v) => AttributeValue::Shorts(v.clone()),
            Values::U16(v) => AttributeValue::Ushorts(v.clone()),
            Values::I32(v) => AttributeValue::Ints(v.clone()),
            Values::U32(v) => AttributeValue::Uints(v.clone()),
            Values::I64(v) => AttributeValue::Longlongs(v.clone()),
            Values::U64(v) => AttributeValue::Ulonglongs(v.clone()),
            Values::F32(v) => AttributeValue::Floats(v.clone()),
            Values::F64(v) => AttributeValue::Doubles(v.clone()),
        },
    }
}

fn read_values(var: &netcdf::Variable) -> Result<Values, Error> {
    Ok(match var.vartype() {
        NcVariableType::Int(IntType::I8) => Values::I8(var.get_values::<i8, _>(..)?),
        NcVariableType::Int(IntType::U8) => Values::U8(var.get_values::<u8, _>(..)?),
        NcVariableType::Int(IntType::I16) => Values::I16(var.get_values::<i16, _>(..)?),
        NcVariableType::Int(IntType::U16) => Values::U16(var.get_values::<u16, _>(..)?),
        NcVariableType::Int(IntType::I32) => Values::I32(var.get_values::<i32, _>(..)?),
        NcVariableType::Int(IntType::U32) => Values::U32(var.get_values::<u32, _>(..)?),
        NcVariableType::Int(IntType::I64) => Values::I64(var.get_values::<i64, _>(..)?),
        NcVariableType::Int(IntType::U64) => Values::U64(var.get_values::<u64, _>(..)?),
        NcVariableType::Float(FloatType::F32) => Values::F32(var.get_values::<f32, _>(..)?),
        NcVariableType::Float(FloatType::F64) => Values::F64(var.get_values::<f64, _>(..)?),
        other => {
            return Err(Error::UnsupportedType {
                var: var.name(),
                ty: format!("{other:?}"),
            });
        }
    })
}

/// Read a NetCDF file into memory. Variables and attributes keep their
/// NetCDF types. Variables of non numeric types are rejected.
pub fn read_dataset(path: &Path) -> Result<Dataset, Error> {
    let file = netcdf::open(path)?;
    let mut ds = Dataset::new();
    for dim in file.dimensions() {
        ds.add_dimension(&dim.name(), dim.len())?;
    }
    for attr in file.attributes() {
        let name = attr.name();
        ds.set_attr(name, from_netcdf_attr(name, attr.value()?)?);
    }
    for var in file.variables() {
        let name = var.name();
        let values = read_values(&var)?;
        let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
        let dims: Vec<&str> = dims.iter().map(|d| d.as_str()).collect();
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let mut out = Variable::new(name.as_str(), &dims, &shape, values)?;
        for attr in var.attributes() {
            let attr_name = attr.name();
            out.set_attr(attr_name, from_netcdf_attr(attr_name, attr.value()?)?);
        }
        ds.add_variable(out)?;
    }
    debug!(
        "Read {} variables from {}",
        ds.num_variables(),
        path.display()
    );
    Ok(ds)
}

/// The fill value is stored with the type of the variable.
fn put_fill_value(
    var: &mut netcdf::VariableMut,
    values: &Values,
    fill: &AttrValue,
) -> Result<(), Error> {
    let Some(fill) = fill.as_f64() else {
        warn!("Ignoring non numeric fill value of `{}`", var.name());
        return Ok(());
    };
    match values {
        Values::I8(_) => var.set_fill_value(fill as i8)?,
        Values::U8(_) => var.set_fill_value(fill as u8)?,
        Values::I16(_) => var.set_fill_value(fill as i16)?,
        Values::U16(_) => var.set_fill_value(fill as u16)?,
        Values::I32(_) => var.set_fill_value(fill as i32)?,
        Values::U32(_) => var.set_fill_value(fill as u32)?,
        Values::I64(_) => var.set_fill_value(fill as i64)?,
        Values::U64(_) => var.set_fill_value(fill as u64)?,
        Values::F32(_) => var.set_fill_value(fill as f32)?,
        Values::F64(_) => var.set_fill_value(fill)?,
    }
    Ok(())
}

/// Write a dataset to a new NetCDF-4 file, replacing any existing file.
pub fn write_dataset(ds: &Dataset, path: &Path) -> Result<(), Error> {
    let mut file = netcdf::create_with(path, netcdf::Options::NETCDF4)?;
    for (name, len) in ds.dimensions() {
        file.add_dimension(name, len)?;
    }
    for (name, value) in ds.attrs() {
        file.add_attribute(name, to_netcdf_attr(value))?;
    }
    for var in ds.variables() {
        let dims: Vec<&str> = var.dims().iter().map(|d| d.as_str()).collect();
        let values = var.values();
        let mut out = match values {
            Values::I8(_) => file.add_variable::<i8>(var.name(), &dims)?,
            Values::U8(_) => file.add_variable::<u8>(var.name(), &dims)?,
            Values::I16(_) => file.add_variable::<i16>(var.name(), &dims)?,
            Values::U16(_) => file.add_variable::<u16>(var.name(), &dims)?,
            Values::I32(_) => file.add_variable::<i32>(var.name(), &dims)?,
            Values::U32(_) => file.add_variable::<u32>(var.name(), &dims)?,
            Values::I64(_) => file.add_variable::<i64>(var.name(), &dims)?,
            Values::U64(_) => file.add_variable::<u64>(var.name(), &dims)?,
            Values::F32(_) => file.add_variable::<f32>(var.name(), &dims)?,
            Values::F64(_) => file.add_variable::<f64>(var.name(), &dims)?,
        };
        for (name, value) in var.attrs() {
            if name == "_FillValue" {
                put_fill_value(&mut out, values, value)?;
            } else {
                out.put_attribute(name, to_netcdf_attr(value))?;
            }
        }
        match values {
            Values::I8(v) => out.put_values(v.as_slice(), ..)?,
            Values::U8(v) => out.put_values(v.as_slice(), ..)?,
            Values::I16(v) => out.put_values(v.as_slice(), ..)?,
            Values::U16(v) => out.put_values(v.as_slice(), ..)?,
            Values::I32(v) => out.put_values(v.as_slice(), ..)?,
            Values::U32(v) => out.put_values(v.as_slice(), ..)?,
            Values::I64(v) => out.put_values(v.as_slice(), ..)?,
            Values::U64(v) => out.put_values(v.as_slice(), ..)?,
            Values::F32(v) => out.put_values(v.as_slice(), ..)?,
            Values::F64(v) => out.put_values(v.as_slice(), ..)?,
        }
    }
    debug!(
        "Wrote {} variables to {}",
        ds.num_variables(),
        path.display()
    );
    Ok(())
}

impl UgridConverter {
    /// Read the ICON grid file at `input`, normalize it, and write it next to
    /// the input as given by [`UgridConverter::output_path`]. An existing file
    /// at that path is removed first. Returns the path of the written file.
    pub fn convert_file(&self, input: &Path) -> Result<PathBuf, Error> {
        let mut ds = read_dataset(input)?;
        self.normalize(&mut ds)?;
        let output = self.output_path(input);
        if output.exists() {
            info!("Replacing existing file {}", output.display());
            fs::remove_file(&output)?;
        }
        write_dataset(&ds, &output)?;
        info!("Wrote UGRID file {}", output.display());
        Ok(output)
    }
}

/// Convert an ICON grid file to UGRID with the default converter, returning
/// the path of the written file.
pub fn icon_grid_to_ugrid(path: &Path) -> Result<PathBuf, Error> {
    UgridConverter::default().convert_file(path)
}

/// Open a UGRID grid file.
pub fn open_grid(path: &Path) -> Result<Grid, Error> {
    Grid::from_ugrid(&read_dataset(path)?)
}

/// Write a grid as a UGRID file.
pub fn write_grid(grid: &Grid, path: &Path) -> Result<(), Error> {
    write_dataset(&grid.to_ugrid()?, path)
}

/// Open a data file defined on the faces of the grid in a separate UGRID
/// file. `face_dim` is the name of the face dimension in the data file.
pub fn open_ux_dataset(
    grid_path: &Path,
    data_path: &Path,
    face_dim: &str,
) -> Result<UxDataset, Error> {
    let grid = open_grid(grid_path)?;
    UxDataset::with_face_dim(Some(grid), read_dataset(data_path)?, face_dim)
}
