use icon_ugrid::{
    AttrValue, BoundaryParams, Dataset, DistanceMetric, Error, FH, Grid, Handle, MeshData,
    UxDataset, Values, Variable, normalize_icon_grid, remove_boundary_faces,
};

/// A one based dataset laid out like an ICON grid file, describing the given
/// grid.
fn icon_dataset(grid: &Grid) -> Dataset {
    let one_based_transposed = |rows: Vec<Vec<u32>>, width: usize| -> Values {
        Values::I32(
            (0..width)
                .flat_map(|k| rows.iter().map(move |r| r[k] as i32 + 1))
                .collect(),
        )
    };
    let (nnode, nedge, nface) = (grid.num_nodes(), grid.num_edges(), grid.num_faces());
    let mut ds = Dataset::new();
    let vars = [
        Variable::new("vlon", &["vertex"], &[nnode], Values::F64(grid.node_lons().to_vec())),
        Variable::new("vlat", &["vertex"], &[nnode], Values::F64(grid.node_lats().to_vec())),
        Variable::new(
            "vertex_of_cell",
            &["nv", "cell"],
            &[3, nface],
            one_based_transposed(
                grid.face_node_connectivity()
                    .iter()
                    .map(|f| f.iter().map(|v| v.index()).collect())
                    .collect(),
                3,
            ),
        ),
        Variable::new(
            "edge_of_cell",
            &["nv", "cell"],
            &[3, nface],
            one_based_transposed(
                grid.face_edge_connectivity()
                    .iter()
                    .map(|f| f.iter().map(|e| e.index()).collect())
                    .collect(),
                3,
            ),
        ),
        Variable::new(
            "edge_vertices",
            &["nc", "edge"],
            &[2, nedge],
            one_based_transposed(
                grid.edge_node_connectivity()
                    .iter()
                    .map(|e| e.iter().map(|v| v.index()).collect())
                    .collect(),
                2,
            ),
        ),
        // Plain one based numbering of the cells.
        Variable::new(
            "cell_index",
            &["cell"],
            &[nface],
            Values::I32((1..=nface as i32).collect()),
        ),
    ];
    for var in vars {
        ds.add_variable(var.expect("Cannot create variable"))
            .expect("Cannot add variable");
    }
    ds
}

#[test]
fn t_torus_pipeline() {
    let torus = Grid::torus(16, 13, 5.0, 5.0).expect("Cannot create torus");
    let mut ds = icon_dataset(&torus);
    normalize_icon_grid(&mut ds).expect("Cannot normalize");
    let mesh = ds.try_variable("mesh").expect("Missing topology");
    assert_eq!(
        mesh.attr("cf_role").and_then(AttrValue::as_str),
        Some("mesh_topology")
    );
    let cells = ds.try_variable("cell_index").expect("Missing variable");
    assert_eq!(cells.values().to_i64().expect("Not integers")[0], 0);

    let grid = Grid::from_ugrid_with(&ds, DistanceMetric::Planar).expect("Cannot read grid");
    assert_eq!(grid, torus);
    assert_eq!(grid.num_faces(), 416);
    assert_eq!(grid.num_nodes(), 208);
    let boundary = grid
        .boundary_faces(&BoundaryParams::default())
        .expect("Cannot classify faces");
    assert_eq!(boundary.len(), 56);

    // Face data keyed by the original face index.
    let mut data = Dataset::new();
    data.add_variable(
        Variable::new(
            "temperature",
            &["cell"],
            &[416],
            Values::F64((0..416).map(|i| i as f64).collect()),
        )
        .expect("Cannot create variable"),
    )
    .expect("Cannot add variable");
    let input = MeshData::Dataset(
        UxDataset::with_face_dim(Some(grid.clone()), data, "cell").expect("Cannot create dataset"),
    );
    let MeshData::Dataset(pruned) = remove_boundary_faces(&input).expect("Cannot prune") else {
        panic!("Expected a dataset");
    };
    let pruned_grid = pruned.try_uxgrid().expect("Missing grid");
    assert_eq!(pruned_grid.num_faces(), 360);
    assert_eq!(pruned_grid.num_nodes(), 208);
    pruned_grid.check_topology().expect("Topology check failed");
    let temp = pruned
        .data()
        .try_variable("temperature")
        .expect("Missing variable")
        .values()
        .to_f64();
    assert_eq!(temp.len(), 360);
    assert_eq!(temp.iter().copied().fold(f64::MAX, f64::min), 0.0);
    assert!(temp.windows(2).all(|w| w[0] < w[1]));
    let bbox = grid.bounds().expect("Cannot compute bounds");
    for t in &temp {
        let f: FH = (*t as u32).into();
        assert!(!boundary.contains(&f));
        assert!(!grid.is_boundary_face(f, &bbox, &BoundaryParams::default()));
    }

    // Pruning the bare grid gives the same grid.
    let MeshData::Grid(bare) = remove_boundary_faces(&MeshData::Grid(grid)).expect("Cannot prune")
    else {
        panic!("Expected a grid");
    };
    assert_eq!(&bare, pruned_grid);
}

#[test]
fn t_prune_without_grid() {
    let mut data = Dataset::new();
    data.add_variable(
        Variable::new("temperature", &["cell"], &[2], Values::F64(vec![1.0, 2.0]))
            .expect("Cannot create variable"),
    )
    .expect("Cannot add variable");
    let input = MeshData::Dataset(
        UxDataset::with_face_dim(None, data, "cell").expect("Cannot create dataset"),
    );
    assert!(matches!(
        remove_boundary_faces(&input),
        Err(Error::MissingGrid)
    ));
}
