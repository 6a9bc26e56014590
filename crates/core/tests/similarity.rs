use partbin_core::similarity::{closest, distance, within};

#[test]
fn distance_basics() {
    assert_eq!(distance("10k", "10k"), 0);
    assert_eq!(distance("", "abc"), 3);
    assert_eq!(distance("kitten", "sitting"), 3);
    assert_eq!(distance("tl072", "tl074"), 1);
}

#[test]
fn distance_is_symmetric() {
    let pairs = [("tl072", "tl07"), ("2n5088", "2n3904"), ("", "x"), ("fuzz", "buzz")];
    for (a, b) in pairs {
        assert_eq!(distance(a, b), distance(b, a), "{a} / {b}");
    }
}

#[test]
fn within_respects_threshold() {
    assert!(within("abcdef", "abcdxy", 2));
    assert!(!within("abcdef", "abcxyz", 2));
}

#[test]
fn closest_keeps_first_on_ties_and_stops_at_exact() {
    let candidates = vec![("aa1", "aa1".to_string()), ("aa2", "aa2".to_string())];
    assert_eq!(closest("aa3", candidates), Some(("aa1", 1)));

    let candidates = vec![("x", "zzz".to_string()), ("y", "abc".to_string())];
    assert_eq!(closest("abc", candidates), Some(("y", 0)));

    assert_eq!(closest("abc", Vec::<(&str, String)>::new()), None);
}
