use contable_executor::drivers::mysql::{bit_text, first_result_set};
use sqlx::Either;

#[test]
fn only_the_first_result_set_is_kept() {
    let items = vec![
        Either::Right("t1"),
        Either::Right("t2"),
        Either::Left(()),
        Either::Right("u1"),
        Either::Left(()),
        Either::Left(()),
    ];
    assert_eq!(first_result_set(items), vec!["t1", "t2"]);
}

#[test]
fn empty_first_set_does_not_borrow_the_next_one() {
    let items = vec![Either::Left(()), Either::Right("u1"), Either::Right("u2"), Either::Left(())];
    assert!(first_result_set(items).is_empty());
}

#[test]
fn same_shaped_sets_are_not_concatenated() {
    let items = vec![
        Either::Right(("a", 1)),
        Either::Left(()),
        Either::Right(("a", 2)),
        Either::Left(()),
    ];
    assert_eq!(first_result_set(items), vec![("a", 1)]);
}

#[test]
fn call_without_select_has_no_rows() {
    let items: Vec<Either<(), &str>> = vec![Either::Left(())];
    assert!(first_result_set(items).is_empty());
    let none: Vec<Either<(), &str>> = Vec::new();
    assert!(first_result_set(none).is_empty());
}

#[test]
fn bit_values_read_as_unsigned_numbers() {
    assert_eq!(bit_text(&[0x01]), "1");
    assert_eq!(bit_text(&[0x00]), "0");
    assert_eq!(bit_text(&[0x01, 0x00]), "256");
    assert_eq!(bit_text(&[0xff; 8]), u64::MAX.to_string());
    assert_eq!(bit_text(&[]), "0");
}
