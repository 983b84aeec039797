use std::sync::Arc;

use flow_fractal::{
    data_structures::material::{Color, Material},
    fractal::gradient::MaterialGradient,
};

use crate::common::test_utils::assert_close;

mod common;

fn template() -> Material {
    Material::new("standard", Color::rgb(0.2, 0.2, 0.2))
}

fn assert_color_close(actual: Color, expected: Color) {
    assert_close(actual.r, expected.r, 1e-6);
    assert_close(actual.g, expected.g, 1e-6);
    assert_close(actual.b, expected.b, 1e-6);
    assert_close(actual.a, expected.a, 1e-6);
}

#[test]
fn deepest_row_is_always_magenta_and_red() {
    for max_depth in 0..=8 {
        let table = MaterialGradient::build(&template(), max_depth);
        assert_eq!(table.len(), max_depth as usize + 1);
        let deepest = &table.rows()[max_depth as usize];
        assert_eq!(deepest[0].color, Color::MAGENTA, "max_depth {}", max_depth);
        assert_eq!(deepest[1].color, Color::RED, "max_depth {}", max_depth);
    }
}

#[test]
fn root_level_starts_white() {
    let table = MaterialGradient::build(&template(), 4);
    assert_eq!(table.get(0, 0).unwrap().color, Color::WHITE);
    assert_eq!(table.get(0, 1).unwrap().color, Color::WHITE);
}

#[test]
fn colours_follow_a_quadratic_curve() {
    let table = MaterialGradient::build(&template(), 5);
    // depth 2 of 4 interpolated steps: t = (2 / 4)^2
    assert_eq!(
        table.get(2, 0).unwrap().color,
        Color::lerp(Color::WHITE, Color::YELLOW, 0.25)
    );
    assert_eq!(
        table.get(2, 1).unwrap().color,
        Color::lerp(Color::WHITE, Color::CYAN, 0.25)
    );
    // the last interpolated level reaches the accents
    assert_color_close(table.get(4, 0).unwrap().color, Color::YELLOW);
    assert_color_close(table.get(4, 1).unwrap().color, Color::CYAN);
}

#[test]
fn shallow_trees_do_not_produce_nan() {
    let single = MaterialGradient::build(&template(), 0);
    assert_eq!(single.len(), 1);
    assert_eq!(single.get(0, 0).unwrap().color, Color::MAGENTA);

    let two = MaterialGradient::build(&template(), 1);
    assert_eq!(two.len(), 2);
    assert_eq!(two.get(0, 0).unwrap().color, Color::WHITE);
    assert_eq!(two.get(0, 1).unwrap().color, Color::WHITE);
    assert_eq!(two.get(1, 1).unwrap().color, Color::RED);
    for row in two.rows() {
        for cell in row {
            assert!(!cell.color.r.is_nan() && !cell.color.g.is_nan() && !cell.color.b.is_nan());
        }
    }
}

#[test]
fn cells_are_independent_copies_of_the_template() {
    let template = template();
    let table = MaterialGradient::build(&template, 3);
    assert_eq!(template.color, Color::rgb(0.2, 0.2, 0.2));
    for row in table.rows() {
        assert!(!Arc::ptr_eq(&row[0], &row[1]));
        for cell in row {
            assert_eq!(cell.name, "standard");
        }
    }
    assert!(table.get(4, 0).is_none());
    assert!(table.get(0, 2).is_none());
}
