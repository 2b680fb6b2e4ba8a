//! File-level round trips through a temporary directory.

use ndarray::{Array2, Array3};

use grid_store::{
    read_field, read_field2, write_field, write_field2, FieldAttrs, GridField2, GriddedField,
};

fn sample_field() -> GriddedField {
    let mut data = Array3::from_elem((2, 3, 4), f32::NAN);
    data[[0, 0, 0]] = 1.0;
    data[[0, 2, 3]] = 2.5;
    data[[1, 1, 1]] = -0.5;
    GriddedField::new(
        "O3_TROP",
        data,
        vec![-53.3, -53.2, -53.1, -53.0],
        vec![-25.3, -25.2, -25.1],
        vec![12000, 12001],
    )
    .unwrap()
}

#[test]
fn test_field_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("o3_trop.nc");

    let field = sample_field();
    let attrs = FieldAttrs {
        units: Some("mol m-2".to_string()),
        long_name: Some("Tropospheric ozone column".to_string()),
        description: None,
        history: Some("test file".to_string()),
    };
    write_field(&path, &field, &attrs).unwrap();

    let read_back = read_field(&path, "O3_TROP").unwrap();
    assert_eq!(read_back.shape(), field.shape());
    assert_eq!(read_back.x, field.x);
    assert_eq!(read_back.y, field.y);
    assert_eq!(read_back.t, field.t);

    for (a, b) in field.data.iter().zip(read_back.data.iter()) {
        if a.is_nan() {
            assert!(b.is_nan());
        } else {
            assert_eq!(a, b);
        }
    }
}

#[test]
fn test_field2_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hcho_mean.nc");

    let data = Array2::from_shape_fn((3, 2), |(j, i)| (j * 2 + i) as f32 * 0.5);
    let field = GridField2::new(
        "HCHO_mean",
        data,
        vec![2.1, 2.2],
        vec![45.0, 45.1, 45.2],
    )
    .unwrap();

    write_field2(&path, &field, &FieldAttrs::default()).unwrap();

    let read_back = read_field2(&path, "HCHO_mean").unwrap();
    assert_eq!(read_back.shape(), (3, 2));
    assert_eq!(read_back.data, field.data);
}

#[test]
fn test_missing_variable_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("o3.nc");

    write_field(&path, &sample_field(), &FieldAttrs::default()).unwrap();
    assert!(read_field(&path, "NO2").is_err());
}
