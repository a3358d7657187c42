mod common;

use common::approx;
use search_core::TokenVector;

fn vector(values: &[f64]) -> TokenVector {
    values.iter().enumerate().map(|(i, v)| (format!("t{i}"), *v)).collect()
}

#[test]
fn equal_vectors() {
    let a = vector(&[0.1, 0.2, 0.3, 0.4, 0.5]);
    let b = vector(&[0.1, 0.2, 0.3, 0.4, 0.5]);
    assert!(approx(a.cosine_similarity(&b), 1.0, 1e-12));
    assert!(approx(a.cosine_similarity(&a), 1.0, 1e-12));
}

#[test]
fn orthogonal_vectors() {
    let a = vector(&[1.0, 0.0, 0.0]);
    let b = vector(&[0.0, 1.0, 0.0]);
    assert_eq!(a.cosine_similarity(&b), 0.0);

    let x: TokenVector = [("x", 1.0)].into_iter().collect();
    let y: TokenVector = [("y", 1.0)].into_iter().collect();
    assert_eq!(x.cosine_similarity(&y), 0.0);
}

#[test]
fn random_positive_vectors_are_between_zero_and_one() {
    let a = vector(&[0.1, 0.2, 0.3, 0.4, 0.5]);
    let b = vector(&[0.5, 0.4, 0.3, 0.2, 0.1]);
    let sim = a.cosine_similarity(&b);
    assert!(sim > 0.0 && sim < 1.0);
}

#[test]
fn specific_result() {
    let a = vector(&[0.1, 0.2, 0.3, 0.4, 0.5]);
    let b = vector(&[0.5, 0.4, 0.3, 0.2, 0.1]);
    assert!(approx(a.cosine_similarity(&b), 0.6364, 1e-4));
}

#[test]
fn similarity_is_symmetric() {
    let a: TokenVector = [("brie", 0.3), ("gouda", 1.2), ("feta", 0.0)].into_iter().collect();
    let b: TokenVector = [("gouda", 0.4), ("edam", 2.0)].into_iter().collect();
    assert!(approx(a.cosine_similarity(&b), b.cosine_similarity(&a), 1e-15));
}

#[test]
fn scale_does_not_change_similarity() {
    let a = vector(&[1.0, 2.0, 3.0]);
    let b = vector(&[10.0, 20.0, 30.0]);
    assert!(approx(a.cosine_similarity(&b), 1.0, 1e-12));
    assert!(approx(b.norm(), 10.0 * a.norm(), 1e-12));
}

#[test]
fn absent_vector_scores_zero() {
    let a = vector(&[1.0]);
    let missing: Option<&TokenVector> = None;
    assert_eq!(missing.map_or(0.0, |b| a.cosine_similarity(b)), 0.0);
}
