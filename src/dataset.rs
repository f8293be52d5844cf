/*!
In-memory model of a self describing array dataset, mirroring what a NetCDF
file holds: named dimensions, named variables with typed, row-major values, and
attributes on both the variables and the dataset itself.
*/

use crate::error::Error;

/// Typed, flat, row-major buffer of a variable. There is one variant per
/// numeric NetCDF type, so values keep their type through a read and write.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// Apply the same expression to the buffer of every variant, producing values
/// of the same variant.
macro_rules! map_buffer {
    ($values:expr, $buf:ident => $body:expr) => {
        match $values {
            Values::I8($buf) => Values::I8($body),
            Values::U8($buf) => Values::U8($body),
            Values::I16($buf) => Values::I16($body),
            Values::U16($buf) => Values::U16($body),
            Values::I32($buf) => Values::I32($body),
            Values::U32($buf) => Values::U32($body),
            Values::I64($buf) => Values::I64($body),
            Values::U64($buf) => Values::U64($body),
            Values::F32($buf) => Values::F32($body),
            Values::F64($buf) => Values::F64($body),
        }
    };
}

/// Evaluate the same expression on the buffer of every variant.
macro_rules! with_buffer {
    ($values:expr, $buf:ident => $body:expr) => {
        match $values {
            Values::I8($buf) => $body,
            Values::U8($buf) => $body,
            Values::I16($buf) => $body,
            Values::U16($buf) => $body,
            Values::I32($buf) => $body,
            Values::U32($buf) => $body,
            Values::I64($buf) => $body,
            Values::U64($buf) => $body,
            Values::F32($buf) => $body,
            Values::F64($buf) => $body,
        }
    };
}

fn map_ints<T: Copy + Into<i64>, U>(v: &[T], f: impl Fn(i64) -> i64, cast: impl Fn(i64) -> U) -> Vec<U> {
    v.iter().map(|x| cast(f((*x).into()))).collect()
}

impl Values {
    pub fn len(&self) -> usize {
        with_buffer!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self, Values::F32(_) | Values::F64(_))
    }

    /// Copy of the values as `f64`.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Values::F64(v) => v.clone(),
            _ => with_buffer!(self, v => v.iter().map(|x| *x as f64).collect()),
        }
    }

    /// Copy of the values as `i64`, if they are integers. `u64` values above
    /// `i64::MAX` wrap.
    pub fn to_i64(&self) -> Option<Vec<i64>> {
        match self {
            Values::F32(_) | Values::F64(_) => None,
            _ => Some(with_buffer!(self, v => v.iter().map(|x| *x as i64).collect())),
        }
    }

    /// Apply `f` to every integer value. Signed values keep their width.
    /// Unsigned values are widened to the next signed type (`u64` to `i64`),
    /// so that negative results such as a fill value of `-1` are
    /// representable. Returns `None` for floating point values.
    pub fn map_integers(&self, f: impl Fn(i64) -> i64) -> Option<Values> {
        Some(match self {
            Values::I8(v) => Values::I8(map_ints(v, f, |x| x as i8)),
            Values::U8(v) => Values::I16(map_ints(v, f, |x| x as i16)),
            Values::I16(v) => Values::I16(map_ints(v, f, |x| x as i16)),
            Values::U16(v) => Values::I32(map_ints(v, f, |x| x as i32)),
            Values::I32(v) => Values::I32(map_ints(v, f, |x| x as i32)),
            Values::U32(v) => Values::I64(map_ints(v, f, |x| x)),
            Values::I64(v) => Values::I64(map_ints(v, f, |x| x)),
            Values::U64(v) => Values::I64(v.iter().map(|x| f(*x as i64)).collect()),
            Values::F32(_) | Values::F64(_) => return None,
        })
    }

    fn gather(&self, shape: &[usize], axis: usize, indices: &[usize]) -> Values {
        map_buffer!(self, buf => gather(buf, shape, axis, indices))
    }

    fn transpose(&self, rows: usize, cols: usize) -> Values {
        map_buffer!(self, buf => transpose(buf, rows, cols))
    }
}

/// Select `indices` along `axis` of a row-major array of the given shape.
fn gather<T: Copy>(data: &[T], shape: &[usize], axis: usize, indices: &[usize]) -> Vec<T> {
    let outer: usize = shape[..axis].iter().product();
    let inner: usize = shape[(axis + 1)..].iter().product();
    let len = shape[axis];
    let mut out = Vec::with_capacity(outer * indices.len() * inner);
    for o in 0..outer {
        for i in indices {
            let start = (o * len + i) * inner;
            out.extend_from_slice(&data[start..(start + inner)]);
        }
    }
    out
}

fn transpose<T: Copy>(data: &[T], rows: usize, cols: usize) -> Vec<T> {
    (0..cols)
        .flat_map(|j| (0..rows).map(move |i| data[i * cols + j]))
        .collect()
}

/// Value of an attribute. Attributes created in memory use the `i64` and
/// `f64` variants. Attributes read from a file with any other numeric type
/// are kept as [`AttrValue::Numbers`], so they are written back with the type
/// they were read with.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Double(f64),
    Str(String),
    Ints(Vec<i64>),
    Doubles(Vec<f64>),
    Strs(Vec<String>),
    Numbers(Values),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s.as_str()),
            AttrValue::Strs(v) if v.len() == 1 => Some(v[0].as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            AttrValue::Ints(v) if v.len() == 1 => Some(v[0]),
            AttrValue::Numbers(v) if v.len() == 1 => v.to_i64().map(|v| v[0]),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(i) => Some(*i as f64),
            AttrValue::Double(d) => Some(*d),
            AttrValue::Doubles(v) if v.len() == 1 => Some(v[0]),
            AttrValue::Numbers(v) if v.len() == 1 => Some(v.to_f64()[0]),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        AttrValue::Int(i as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(d: f64) -> Self {
        AttrValue::Double(d)
    }
}

fn find_attr<'a>(attrs: &'a [(String, AttrValue)], name: &str) -> Option<&'a AttrValue> {
    attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v)
}

fn put_attr(attrs: &mut Vec<(String, AttrValue)>, name: &str, value: AttrValue) {
    match attrs.iter_mut().find(|(n, _)| n == name) {
        Some((_, v)) => *v = value,
        None => attrs.push((name.to_string(), value)),
    }
}

/// A named, n-dimensional array with attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    dims: Vec<String>,
    shape: Vec<usize>,
    values: Values,
    attrs: Vec<(String, AttrValue)>,
}

impl Variable {
    /// Create a variable with the given dimensions. The number of values must
    /// match the shape.
    pub fn new(
        name: impl Into<String>,
        dims: &[&str],
        shape: &[usize],
        values: Values,
    ) -> Result<Self, Error> {
        let name = name.into();
        if dims.len() != shape.len() || shape.iter().product::<usize>() != values.len() {
            return Err(Error::UnexpectedShape(name));
        }
        Ok(Variable {
            name,
            dims: dims.iter().map(|d| d.to_string()).collect(),
            shape: shape.to_vec(),
            values,
            attrs: Vec::new(),
        })
    }

    /// Create a zero dimensional variable holding a single value.
    pub fn scalar(name: impl Into<String>, values: Values) -> Result<Self, Error> {
        Self::new(name, &[], &[], values)
    }

    /// Builder style version of [`Variable::set_attr`].
    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Position of the dimension `dim` in the shape of this variable.
    pub fn axis(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    pub fn dim_len(&self, dim: &str) -> Option<usize> {
        self.axis(dim).map(|a| self.shape[a])
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        find_attr(&self.attrs, name)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Set an attribute, replacing any previous value with the same name.
    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) {
        put_attr(&mut self.attrs, name, value.into());
    }

    /// Replace the values, keeping the shape.
    pub fn set_values(&mut self, values: Values) -> Result<(), Error> {
        if values.len() != self.values.len() {
            return Err(Error::MismatchedArrayLengths(self.values.len(), values.len()));
        }
        self.values = values;
        Ok(())
    }

    /// New variable with only the given `indices` along dimension `dim`.
    pub fn isel(&self, dim: &str, indices: &[usize]) -> Result<Variable, Error> {
        let axis = self
            .axis(dim)
            .ok_or_else(|| Error::DimensionNotFound(dim.to_string()))?;
        let len = self.shape[axis];
        if let Some(i) = indices.iter().find(|i| **i >= len) {
            return Err(Error::DimensionMismatch {
                name: dim.to_string(),
                expected: len,
                found: *i + 1,
            });
        }
        let mut shape = self.shape.clone();
        shape[axis] = indices.len();
        Ok(Variable {
            name: self.name.clone(),
            dims: self.dims.clone(),
            values: self.values.gather(&self.shape, axis, indices),
            shape,
            attrs: self.attrs.clone(),
        })
    }

    /// Swap the two axes of a two dimensional variable, both the data and the
    /// order of the dimension names.
    pub fn transpose(&self) -> Result<Variable, Error> {
        let [rows, cols] = self.shape[..] else {
            return Err(Error::UnexpectedShape(self.name.clone()));
        };
        Ok(Variable {
            name: self.name.clone(),
            dims: self.dims.iter().rev().cloned().collect(),
            shape: vec![cols, rows],
            values: self.values.transpose(rows, cols),
            attrs: self.attrs.clone(),
        })
    }
}

/// Named dimensions, variables and global attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    dims: Vec<(String, usize)>,
    vars: Vec<Variable>,
    attrs: Vec<(String, AttrValue)>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimensions(&self) -> impl Iterator<Item = (&str, usize)> {
        self.dims.iter().map(|(n, l)| (n.as_str(), *l))
    }

    pub fn dim_len(&self, name: &str) -> Option<usize> {
        self.dims.iter().find(|(n, _)| n == name).map(|(_, l)| *l)
    }

    /// Declare a dimension. Declaring an existing dimension again is fine as
    /// long as the length agrees.
    pub fn add_dimension(&mut self, name: &str, len: usize) -> Result<(), Error> {
        match self.dim_len(name) {
            Some(existing) if existing != len => Err(Error::DimensionMismatch {
                name: name.to_string(),
                expected: existing,
                found: len,
            }),
            Some(_) => Ok(()),
            None => {
                self.dims.push((name.to_string(), len));
                Ok(())
            }
        }
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.vars.iter()
    }

    pub fn num_variables(&self) -> usize {
        self.vars.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variable(name).is_some()
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.vars.iter().find(|v| v.name == name)
    }

    /// Same as [`Dataset::variable`], but a missing variable is an error.
    pub fn try_variable(&self, name: &str) -> Result<&Variable, Error> {
        self.variable(name)
            .ok_or_else(|| Error::VariableNotFound(name.to_string()))
    }

    /// Add a variable, declaring its dimensions as needed. A variable with the
    /// same name is replaced in place.
    pub fn add_variable(&mut self, var: Variable) -> Result<(), Error> {
        for (dim, len) in var.dims.iter().zip(var.shape.iter()) {
            self.add_dimension(dim, *len)?;
        }
        match self.vars.iter_mut().find(|v| v.name == var.name) {
            Some(existing) => *existing = var,
            None => self.vars.push(var),
        }
        Ok(())
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        let pos = self.vars.iter().position(|v| v.name == name)?;
        Some(self.vars.remove(pos))
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        find_attr(&self.attrs, name)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) {
        put_attr(&mut self.attrs, name, value.into());
    }

    /// New dataset with only the given `indices` along dimension `dim`, in
    /// every variable that has that dimension. Other variables are copied.
    pub fn isel(&self, dim: &str, indices: &[usize]) -> Result<Dataset, Error> {
        if self.dim_len(dim).is_none() {
            return Err(Error::DimensionNotFound(dim.to_string()));
        }
        let vars = self
            .vars
            .iter()
            .map(|v| match v.axis(dim) {
                Some(_) => v.isel(dim, indices),
                None => Ok(v.clone()),
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let dims = self
            .dims
            .iter()
            .map(|(n, l)| (n.clone(), if n == dim { indices.len() } else { *l }))
            .collect();
        Ok(Dataset {
            dims,
            vars,
            attrs: self.attrs.clone(),
        })
    }
}
