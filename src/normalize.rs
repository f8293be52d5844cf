/*!
Conversion of ICON grid datasets to UGRID.

ICON stores its connectivity and index arrays with one based indices, uses
non-positive values for "no neighbour", and lays out two dimensional arrays as
`(nv, cell)`. The [`UgridConverter`] rewrites a configurable list of such
arrays to zero based indices in `(cell, nv)` layout, and attaches a mesh
topology variable that UGRID readers look for.
*/

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    dataset::{Dataset, Variable},
    error::Error,
    ugrid::MeshTopology,
};

/// How the values of an index variable are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRule {
    /// The index of the first element in the input. Values at or above this
    /// are shifted down by it, values below it become the fill value.
    pub start_index: i64,
    /// Value marking a missing index in the output.
    pub fill_value: i64,
    /// Transpose two dimensional arrays so that the longer axis, i.e. the
    /// element count, comes first.
    pub count_first: bool,
}

/// The rule for every ICON index variable.
pub const ICON_ONE_BASED: IndexRule = IndexRule {
    start_index: 1,
    fill_value: -1,
    count_first: true,
};

/// The ICON variables that hold one based indices.
pub const ICON_INDEX_FIELDS: &[(&str, IndexRule)] = &[
    ("cell_index", ICON_ONE_BASED),
    ("edge_index", ICON_ONE_BASED),
    ("vertex_index", ICON_ONE_BASED),
    ("parent_cell_index", ICON_ONE_BASED),
    ("parent_edge_index", ICON_ONE_BASED),
    ("parent_vertex_index", ICON_ONE_BASED),
    ("start_idx_c", ICON_ONE_BASED),
    ("end_idx_c", ICON_ONE_BASED),
    ("start_idx_e", ICON_ONE_BASED),
    ("end_idx_e", ICON_ONE_BASED),
    ("start_idx_v", ICON_ONE_BASED),
    ("end_idx_v", ICON_ONE_BASED),
    ("neighbor_cell_index", ICON_ONE_BASED),
    ("edge_of_cell", ICON_ONE_BASED),
    ("vertex_of_cell", ICON_ONE_BASED),
    ("adjacent_cell_of_edge", ICON_ONE_BASED),
    ("edge_vertices", ICON_ONE_BASED),
    ("cells_of_vertex", ICON_ONE_BASED),
    ("edges_of_vertex", ICON_ONE_BASED),
    ("vertices_of_vertex", ICON_ONE_BASED),
];

impl IndexRule {
    pub fn apply(&self, value: i64) -> i64 {
        if value >= self.start_index {
            value - self.start_index
        } else {
            self.fill_value
        }
    }

    /// Rewrite the values of `var`, annotate it with the new `start_index`
    /// and `_FillValue`, and transpose it if needed.
    pub fn normalize(&self, var: &Variable) -> Result<Variable, Error> {
        let values = var
            .values()
            .map_integers(|v| self.apply(v))
            .ok_or_else(|| Error::NotAnIndexVariable(var.name().to_string()))?;
        let mut out = var.clone();
        out.set_values(values)?;
        out.set_attr("start_index", 0i64);
        out.set_attr("_FillValue", self.fill_value);
        if self.count_first && out.ndim() == 2 && out.shape()[0] < out.shape()[1] {
            out = out.transpose()?;
        }
        Ok(out)
    }
}

/// Converts ICON grid datasets to UGRID.
#[derive(Debug, Clone)]
pub struct UgridConverter {
    /// Index variables to rewrite, with their rules. Absent variables are
    /// skipped.
    pub fields: Vec<(String, IndexRule)>,
    /// The topology variable attached to the output.
    pub topology: MeshTopology,
    /// Prefix of the output file name.
    pub prefix: String,
}

impl Default for UgridConverter {
    fn default() -> Self {
        UgridConverter {
            fields: ICON_INDEX_FIELDS
                .iter()
                .map(|(name, rule)| (name.to_string(), *rule))
                .collect(),
            topology: MeshTopology::icon(),
            prefix: "ux_".to_string(),
        }
    }
}

impl UgridConverter {
    /// Add or replace the rule for a variable.
    pub fn with_field(mut self, name: &str, rule: IndexRule) -> Self {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, r)) => *r = rule,
            None => self.fields.push((name.to_string(), rule)),
        }
        self
    }

    pub fn with_topology(mut self, topology: MeshTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Rewrite the index variables of `ds` in place and add the topology
    /// variable.
    pub fn normalize(&self, ds: &mut Dataset) -> Result<(), Error> {
        for (name, rule) in &self.fields {
            let Some(var) = ds.variable(name) else {
                debug!("Variable `{name}` not present, skipping");
                continue;
            };
            let var = rule.normalize(var)?;
            debug!("Normalized `{name}` with dimensions {:?}", var.dims());
            ds.add_variable(var)?;
        }
        ds.add_variable(self.topology.to_variable()?)?;
        info!("Added mesh topology variable `{}`", self.topology.name);
        Ok(())
    }

    /// The path the converted dataset is written to: the input file name with
    /// the prefix, in the same directory.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let mut name = std::ffi::OsString::from(&self.prefix);
        if let Some(base) = input.file_name() {
            name.push(base);
        }
        input.with_file_name(name)
    }
}

/// Normalize an ICON dataset in place with the default converter.
pub fn normalize_icon_grid(ds: &mut Dataset) -> Result<(), Error> {
    UgridConverter::default().normalize(ds)
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use crate::{
        dataset::{AttrValue, Dataset, Values, Variable},
        error::Error,
    };

    use super::{ICON_INDEX_FIELDS, ICON_ONE_BASED, IndexRule, UgridConverter, normalize_icon_grid};

    fn icon_dataset() -> Dataset {
        let mut ds = Dataset::new();
        // Four cells, stored (nv, cell).
        ds.add_variable(
            Variable::new(
                "vertex_of_cell",
                &["nv", "cell"],
                &[3, 4],
                Values::I32(vec![
                    1, 2, 3, 4, //
                    2, 3, 4, 5, //
                    3, 4, 5, 1,
                ]),
            )
            .expect("Cannot create variable"),
        )
        .expect("Cannot add variable");
        ds.add_variable(
            Variable::new(
                "neighbor_cell_index",
                &["nv", "cell"],
                &[3, 4],
                Values::I32(vec![
                    2, 1, 0, 3, //
                    4, 0, -1, 0, //
                    0, 3, 4, -2,
                ]),
            )
            .expect("Cannot create variable"),
        )
        .expect("Cannot add variable");
        ds.add_variable(
            Variable::new("clon", &["cell"], &[4], Values::F64(vec![0.5, 1.5, 2.5, 3.5]))
                .expect("Cannot create variable"),
        )
        .expect("Cannot add variable");
        ds
    }

    #[test]
    fn t_allow_list() {
        assert_eq!(ICON_INDEX_FIELDS.len(), 20);
        assert!(ICON_INDEX_FIELDS.iter().all(|(_, r)| *r == ICON_ONE_BASED));
    }

    #[test]
    fn t_index_shift() {
        let rule = ICON_ONE_BASED;
        assert_eq!(rule.apply(1), 0);
        assert_eq!(rule.apply(42), 41);
        assert_eq!(rule.apply(0), -1);
        assert_eq!(rule.apply(-5), -1);
        let zero_based = IndexRule {
            start_index: 0,
            fill_value: -9999,
            count_first: false,
        };
        assert_eq!(zero_based.apply(0), 0);
        assert_eq!(zero_based.apply(-1), -9999);
    }

    #[test]
    fn t_normalize() {
        let mut ds = icon_dataset();
        normalize_icon_grid(&mut ds).expect("Cannot normalize");
        let var = ds.try_variable("vertex_of_cell").expect("Missing variable");
        assert_eq!(var.dims(), &["cell".to_string(), "nv".to_string()]);
        assert_eq!(var.shape(), &[4, 3]);
        assert_eq!(
            var.values(),
            &Values::I32(vec![0, 1, 2, 1, 2, 3, 2, 3, 4, 3, 4, 0])
        );
        assert_eq!(var.attr("start_index"), Some(&AttrValue::Int(0)));
        assert_eq!(var.attr("_FillValue"), Some(&AttrValue::Int(-1)));
        let var = ds
            .try_variable("neighbor_cell_index")
            .expect("Missing variable");
        assert_eq!(var.dims(), &["cell".to_string(), "nv".to_string()]);
        assert_eq!(
            var.values(),
            &Values::I32(vec![1, 3, -1, 0, -1, 2, -1, -1, 3, 2, -1, -1])
        );
        // Not an index variable.
        assert_eq!(
            ds.try_variable("clon").expect("Missing variable").values(),
            &Values::F64(vec![0.5, 1.5, 2.5, 3.5])
        );
        let mesh = ds.try_variable("mesh").expect("Missing topology");
        assert_eq!(mesh.values(), &Values::I32(vec![-1]));
        assert_eq!(mesh.attrs().count(), 13);
        assert_eq!(
            mesh.attr("face_node_connectivity")
                .and_then(AttrValue::as_str),
            Some("vertex_of_cell")
        );
    }

    #[test]
    fn t_transpose_rule() {
        // More elements than entries per element: the count moves first.
        let wide = Variable::new(
            "edge_vertices",
            &["nc", "edge"],
            &[2, 5],
            Values::I32(vec![1, 2, 3, 4, 5, 2, 3, 4, 5, 1]),
        )
        .expect("Cannot create variable");
        let out = ICON_ONE_BASED.normalize(&wide).expect("Cannot normalize");
        assert_eq!(out.dims(), &["edge".to_string(), "nc".to_string()]);
        assert_eq!(out.shape(), &[5, 2]);
        assert_eq!(
            out.values(),
            &Values::I32(vec![0, 1, 1, 2, 2, 3, 3, 4, 4, 0])
        );
        // The first dimension is already the longer one.
        let tall = Variable::new(
            "vertex_of_cell",
            &["nv", "cell"],
            &[3, 2],
            Values::I32(vec![1, 2, 3, 4, 4, 1]),
        )
        .expect("Cannot create variable");
        let out = ICON_ONE_BASED.normalize(&tall).expect("Cannot normalize");
        assert_eq!(out.dims(), &["nv".to_string(), "cell".to_string()]);
        assert_eq!(out.shape(), &[3, 2]);
        assert_eq!(out.values(), &Values::I32(vec![0, 1, 2, 3, 3, 0]));
        let no_transpose = IndexRule {
            count_first: false,
            ..ICON_ONE_BASED
        };
        let out = no_transpose.normalize(&wide).expect("Cannot normalize");
        assert_eq!(out.shape(), &[2, 5]);
    }

    #[test]
    fn t_normalize_is_repeatable() {
        let input = icon_dataset();
        let mut first = input.clone();
        let mut second = input.clone();
        normalize_icon_grid(&mut first).expect("Cannot normalize");
        normalize_icon_grid(&mut second).expect("Cannot normalize");
        assert_eq!(first, second);
    }

    #[test]
    fn t_non_integer_index() {
        let mut ds = Dataset::new();
        ds.add_variable(
            Variable::new("cell_index", &["cell"], &[2], Values::F64(vec![1.0, 2.0]))
                .expect("Cannot create variable"),
        )
        .expect("Cannot add variable");
        assert!(matches!(
            normalize_icon_grid(&mut ds),
            Err(Error::NotAnIndexVariable(name)) if name == "cell_index"
        ));
    }

    #[test]
    fn t_custom_field() {
        let mut ds = Dataset::new();
        ds.add_variable(
            Variable::new("my_index", &["cell"], &[3], Values::I64(vec![3, 0, 1]))
                .expect("Cannot create variable"),
        )
        .expect("Cannot add variable");
        UgridConverter::default()
            .with_field("my_index", ICON_ONE_BASED)
            .normalize(&mut ds)
            .expect("Cannot normalize");
        assert_eq!(
            ds.try_variable("my_index").expect("Missing variable").values(),
            &Values::I64(vec![2, -1, 0])
        );
    }

    #[test]
    fn t_narrow_index_types() {
        let mut ds = Dataset::new();
        for var in [
            Variable::new("cell_index", &["cell"], &[3], Values::U16(vec![1, 2, 0])),
            Variable::new("edge_index", &["edge"], &[2], Values::I16(vec![2, 1])),
        ] {
            ds.add_variable(var.expect("Cannot create variable"))
                .expect("Cannot add variable");
        }
        normalize_icon_grid(&mut ds).expect("Cannot normalize");
        // Widened, so the fill value fits.
        assert_eq!(
            ds.try_variable("cell_index").expect("Missing variable").values(),
            &Values::I32(vec![0, 1, -1])
        );
        assert_eq!(
            ds.try_variable("edge_index").expect("Missing variable").values(),
            &Values::I16(vec![1, 0])
        );
    }

    #[test]
    fn t_output_path() {
        let converter = UgridConverter::default();
        assert_eq!(
            converter.output_path(Path::new("/data/grids/icon_grid_R02B04.nc")),
            PathBuf::from("/data/grids/ux_icon_grid_R02B04.nc")
        );
        assert_eq!(
            converter
                .with_prefix("ugrid_")
                .output_path(Path::new("grid.nc")),
            PathBuf::from("ugrid_grid.nc")
        );
    }
}
