/// A report row: one of our containers measured against its standard library counterpart.
///
/// `candidate` and `baseline` must match the case names the benchmark executable prints
/// byte for byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pairing {
    pub case_id: &'static str,
    pub title: &'static str,
    pub candidate: &'static str,
    pub baseline: &'static str,
}

const fn pair(
    case_id: &'static str,
    title: &'static str,
    candidate: &'static str,
    baseline: &'static str,
) -> Pairing {
    Pairing {
        case_id,
        title,
        candidate,
        baseline,
    }
}

/// Report rows, in the order they appear in the CSV and the charts.
pub const PAIRINGS: &[Pairing] = &[
    pair(
        "deque_push_pop",
        "Deque push_back+pop_front",
        "Deque<int>::push_back+pop_front",
        "std::deque<int>::push_back+pop_front",
    ),
    pair(
        "vector_push_back_no_reserve",
        "Vector push_back (no reserve)",
        "Vector<int>::push_back (no reserve)",
        "std::vector<int>::push_back (no reserve)",
    ),
    pair(
        "vector_push_back_reserve",
        "Vector push_back (reserve)",
        "Vector<int>::push_back (reserve)",
        "std::vector<int>::push_back (reserve)",
    ),
    pair(
        "unordered_map_emplace_reserve",
        "unordered_map emplace (reserve)",
        "unordered_map<string,int>::emplace (reserve)",
        "std::unordered_map<string,int>::emplace (reserve)",
    ),
    pair(
        "map_build_find",
        "map build+find",
        "map/build+find (my-stl)",
        "map/build+find (std::map)",
    ),
    pair(
        "set_build_find",
        "set build+find",
        "set/build+find (my-stl)",
        "set/build+find (std::set)",
    ),
    pair(
        "flat_map_build_find",
        "flat_map build+find",
        "flat_map/build+find (sorted, my-stl)",
        "flat_map/build+find (sorted, std::map)",
    ),
    pair(
        "flat_set_build_find",
        "flat_set build+find",
        "flat_set/build+find (sorted, my-stl)",
        "flat_set/build+find (sorted, std::set)",
    ),
    pair(
        "small_vector_push_back",
        "small_vector push_back",
        "SmallVector<int,16>::push_back",
        "std::vector<int>::push_back",
    ),
    pair(
        "stable_vector_push_back",
        "stable_vector push_back",
        "StableVector<int>::push_back",
        "std::vector<unique_ptr<int>>::push_back",
    ),
];
