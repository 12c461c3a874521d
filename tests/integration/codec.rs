//! Pitch codec integration tests

use ivory::core::{argmax_to_pitch, index_to_pitch, pitch_to_index};
use ivory::{one_hot, Pitch, NUM_KEYS};
use proptest::prelude::*;

#[test]
fn test_piano_range_endpoints() {
    assert_eq!(pitch_to_index("A0").unwrap(), 0);
    assert_eq!(pitch_to_index("C8").unwrap(), 87);
    assert_eq!(pitch_to_index("C4").unwrap(), 39);
}

#[test]
fn test_every_key_has_a_unique_name() {
    let names: std::collections::HashSet<String> = (0..NUM_KEYS)
        .map(|i| index_to_pitch(i).unwrap().to_string())
        .collect();
    assert_eq!(names.len(), NUM_KEYS);
    assert!(index_to_pitch(NUM_KEYS).is_err());
}

#[test]
fn test_invalid_names_are_silent() {
    for name in ["", "H4", "C9", "G#8", "Ab3", "c4", "C#"] {
        assert!(pitch_to_index(name).is_err(), "{name:?} should not parse");
        assert!(one_hot(name).is_silent(), "{name:?} should encode as silence");
        assert!(one_hot(name).to_vec().iter().all(|&v| v == 0.0));
    }
}

#[test]
fn test_silent_vector_ties_to_lowest_key() {
    // Ties resolve to the lowest index; silence is told apart by `OneHot::Silent`.
    assert_eq!(argmax_to_pitch(&[0.0; NUM_KEYS]).unwrap(), Pitch::from_index(0).unwrap());
    assert!(one_hot("").is_silent());
    assert!(argmax_to_pitch(&[0.0; NUM_KEYS - 1]).is_err());
}

proptest! {
    #[test]
    fn prop_one_hot_marks_exactly_one_key(index in 0usize..NUM_KEYS) {
        let pitch = Pitch::from_index(index).unwrap();
        let encoded = one_hot(&pitch.to_string()).to_vec();
        prop_assert_eq!(encoded.len(), NUM_KEYS);
        prop_assert_eq!(encoded.iter().filter(|&&v| v == 1.0).count(), 1);
        prop_assert_eq!(encoded[index], 1.0);
        prop_assert_eq!(argmax_to_pitch(&encoded).unwrap(), pitch);
    }

    #[test]
    fn prop_arbitrary_text_never_panics(text in "\\PC{0,6}") {
        let encoded = one_hot(&text);
        prop_assert_eq!(encoded.is_silent(), pitch_to_index(&text).is_err());
    }
}
