use function_maxima::{FunctionMaxima, InvalidArg};
use rstest::rstest;

fn of(points: &[(i32, i32)]) -> FunctionMaxima<i32, i32> {
	points.iter().copied().collect()
}

fn pairs(f: &FunctionMaxima<i32, i32>) -> Vec<(i32, i32)> {
	f.iter().map(|p| (*p.arg(), *p.value())).collect()
}

fn peaks(f: &FunctionMaxima<i32, i32>) -> Vec<(i32, i32)> {
	f.maxima().map(|p| (*p.arg(), *p.value())).collect()
}

#[test]
fn a_new_container_is_empty() {
	let f = FunctionMaxima::<i32, i32>::new();
	assert_eq!(f.len(), 0);
	assert!(f.is_empty());
	assert_eq!(f.iter().count(), 0);
	assert_eq!(f.maxima().count(), 0);
	assert!(f.find(&0).is_none());
	assert_eq!(f.value_at(&0), Err(InvalidArg));
}

#[test]
fn a_single_point_is_its_own_maximum() {
	let f = of(&[(1, 10)]);
	assert_eq!(pairs(&f), [(1, 10)]);
	assert_eq!(peaks(&f), [(1, 10)]);
}

#[test]
fn a_monotone_function_peaks_at_its_far_end() {
	let f = of(&[(1, 1), (2, 2), (3, 3)]);
	assert_eq!(pairs(&f), [(1, 1), (2, 2), (3, 3)]);
	assert_eq!(peaks(&f), [(3, 3)]);
}

#[test]
fn insertion_order_does_not_matter() {
	let shuffled = of(&[(3, 3), (1, 1), (2, 2)]);
	assert_eq!(pairs(&shuffled), [(1, 1), (2, 2), (3, 3)]);
	assert_eq!(peaks(&shuffled), [(3, 3)]);
}

#[test]
fn equal_valued_peaks_iterate_by_increasing_argument() {
	let f = of(&[(1, 3), (2, 1), (3, 3), (4, 1), (5, 3)]);
	assert_eq!(peaks(&f), [(1, 3), (3, 3), (5, 3)]);
}

#[test]
fn every_point_of_a_plateau_is_a_maximum() {
	let f = of(&[(1, 5), (2, 5), (3, 5)]);
	assert_eq!(peaks(&f), [(1, 5), (2, 5), (3, 5)]);
}

#[test]
fn removing_a_middle_peak_reclassifies_its_neighbours() {
	let mut f = of(&[(1, 3), (2, 1), (3, 3), (4, 1), (5, 3)]);
	let removed = f.remove(&3).unwrap();
	assert_eq!((*removed.arg(), *removed.value()), (3, 3));
	assert_eq!(pairs(&f), [(1, 3), (2, 1), (4, 1), (5, 3)]);
	assert_eq!(peaks(&f), [(1, 3), (5, 3)]);
}

#[test]
fn removing_an_absent_argument_is_a_no_op() {
	let mut f = of(&[(1, 1)]);
	assert!(f.remove(&7).is_none());
	assert_eq!(pairs(&f), [(1, 1)]);
	assert_eq!(peaks(&f), [(1, 1)]);
}

#[test]
fn removing_the_last_point_empties_the_container() {
	let mut f = of(&[(1, 1)]);
	assert!(f.remove(&1).is_some());
	assert!(f.is_empty());
	assert_eq!(f.maxima().count(), 0);
}

#[test]
fn overwriting_with_an_equal_value_changes_nothing() {
	let mut f = of(&[(1, 3), (2, 1), (3, 3), (4, 1), (5, 3)]);
	let (domain, maxima) = (pairs(&f), peaks(&f));
	f.set_value(1, 3);
	assert_eq!(pairs(&f), domain);
	assert_eq!(peaks(&f), maxima);
}

#[rstest]
#[case(9, &[(2, 9)])]
#[case(3, &[(1, 3), (2, 3), (3, 3)])]
#[case(0, &[(1, 3), (3, 3)])]
fn overwriting_an_interior_value_reclassifies_the_neighbourhood(
	#[case] new_value: i32,
	#[case] expected: &[(i32, i32)],
) {
	let mut f = of(&[(1, 3), (2, 1), (3, 3)]);
	f.set_value(2, new_value);
	assert_eq!(peaks(&f), expected);
}

#[rstest]
#[case(1, 0, &[(3, 3)])]
#[case(1, 4, &[(1, 4), (3, 3)])]
#[case(3, 0, &[(1, 3)])]
fn overwriting_an_edge_value_reclassifies_the_neighbourhood(
	#[case] arg: i32,
	#[case] new_value: i32,
	#[case] expected: &[(i32, i32)],
) {
	let mut f = of(&[(1, 3), (2, 1), (3, 3)]);
	f.set_value(arg, new_value);
	assert_eq!(peaks(&f), expected);
}

#[test]
fn value_at_agrees_with_find() {
	let f = of(&[(2, 5)]);
	assert_eq!(*f.value_at(&2).unwrap(), 5);
	assert_eq!(*f.find(&2).unwrap().value(), 5);
	assert_eq!(f.value_at(&3), Err(InvalidArg));
	assert!(f.find(&3).is_none());
}

#[test]
fn the_error_renders_its_fixed_diagnostic() {
	assert_eq!(InvalidArg.to_string(), "invalid argument value");
}

#[test]
fn clones_respond_identically_and_then_diverge() {
	let mut f = of(&[(1, 3), (2, 1)]);
	let g = f.clone();
	assert_eq!(pairs(&g), pairs(&f));
	assert_eq!(peaks(&g), peaks(&f));

	f.set_value(2, 5);
	f.remove(&1);
	assert_eq!(pairs(&f), [(2, 5)]);
	assert_eq!(pairs(&g), [(1, 3), (2, 1)]);
	assert_eq!(peaks(&g), [(1, 3)]);
}

#[test]
fn mutating_a_clone_leaves_the_source_alone() {
	let f = of(&[(1, 3), (2, 1)]);
	let mut g = f.clone();
	g.set_value(1, 0);
	g.remove(&2);
	assert_eq!(pairs(&f), [(1, 3), (2, 1)]);
	assert_eq!(peaks(&f), [(1, 3)]);
	assert_eq!(pairs(&g), [(1, 0)]);
}

#[test]
fn assignment_replaces_the_whole_container() {
	let mut f = of(&[(1, 1)]);
	let g = of(&[(2, 2), (3, 1)]);
	f.clone_from(&g);
	assert_eq!(pairs(&f), [(2, 2), (3, 1)]);
	assert_eq!(peaks(&f), [(2, 2)]);
}

#[test]
fn extend_applies_assignments_in_order() {
	let mut f = of(&[(1, 1)]);
	f.extend([(2, 2), (1, 5), (1, 3)]);
	assert_eq!(pairs(&f), [(1, 3), (2, 2)]);
}

#[test]
fn the_container_iterates_by_reference() {
	let f = of(&[(1, 1), (2, 2)]);
	let args: Vec<i32> = (&f).into_iter().map(|p| *p.arg()).collect();
	assert_eq!(args, [1, 2]);
}

#[test]
fn debug_renders_as_a_map() {
	let f = of(&[(1, 2), (3, 4)]);
	assert_eq!(format!("{f:?}"), "{1: 2, 3: 4}");
}
