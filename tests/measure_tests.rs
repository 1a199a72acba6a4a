use recicart::measure::{WeightUnit, parse_measurement, parse_weight};
use spectral::prelude::*;

macro_rules! assert_weights {
    (
        $(
            $test_name:ident : text => $text:expr, grams => $grams:expr
        ),+ $(,)?
    ) => {
        $(
            #[test]
            fn $test_name() {
                assert_that(&parse_weight($text)).is_equal_to($grams);
            }
        )+
    }
}

assert_weights![
    grams_glued: text => "500g vetemjöl", grams => Some(500.0),
    kilograms_decimal: text => "2.5 kg bananer", grams => Some(2500.0),
    kilo_word: text => "1 kilo potatis", grams => Some(1000.0),
    kilogram_word: text => "1 kilogram potatis", grams => Some(1000.0),
    kilograms_word: text => "1,5 kilograms sugar", grams => Some(1500.0),
    kilos_word: text => "2 kilos potatis", grams => Some(2000.0),
    gr_abbreviation: text => "500 gr köttfärs", grams => Some(500.0),
    gr_glued: text => "250gr smör", grams => Some(250.0),
    gram_word: text => "300 gram smör", grams => Some(300.0),
    grams_plural: text => "200 grams butter", grams => Some(200.0),
    upper_case_unit: text => "2KG", grams => Some(2000.0),
    decimal_comma: text => "1,5 kg mjöl", grams => Some(1500.0),
    volume_is_not_weight: text => "1 liter mjölk", grams => None,
    no_number: text => "en burk jordnötssmör", grams => None,
    word_starting_with_g: text => "3 garlic cloves", grams => None,
    word_starting_with_gr: text => "2 gröna äpplen", grams => None,
    word_starting_with_k: text => "1 kanelstång", grams => None,
    empty: text => "", grams => None,
];

#[test]
fn kilograms_and_grams_agree() {
    assert_that(&parse_weight("2kg")).is_equal_to(parse_weight("2000g"));
}

#[test]
fn first_weight_wins() {
    assert_that(&parse_weight("500g or 1 kg")).is_equal_to(Some(500.0));
}

#[test]
fn measurement_keeps_unit() {
    let measurement = parse_measurement("2.5 kg bananer").expect("Expected a measurement.");

    assert_that(&measurement.unit).is_equal_to(WeightUnit::Kilogram);
    assert_that(&measurement.value).is_equal_to(2.5);
}

#[test]
fn grams_are_rounded_to_milligrams() {
    assert_that(&parse_weight("1.1 kg")).is_equal_to(Some(1100.0));
    assert_that(&parse_weight("0.3kg")).is_equal_to(Some(300.0));
}

#[test]
fn reparsing_grams_is_stable() {
    let grams = parse_weight("0.75 kilo").expect("Expected a weight.");

    assert_that(&parse_weight(&format!("{grams}g"))).is_equal_to(Some(grams));
}
