use proptest::prelude::*;
use warships::core::{CellState, Coord, Grid};

fn cell_state() -> impl Strategy<Value = CellState> {
    prop_oneof![
        Just(CellState::Empty),
        Just(CellState::Ship),
        Just(CellState::Hit),
        Just(CellState::Miss),
        Just(CellState::Sunk),
    ]
}

proptest! {
    #[test]
    fn set_then_get_touches_one_cell(x in 0i32..10, y in 0i32..10, state in cell_state()) {
        let c = Coord::new(x, y).unwrap();
        let mut grid = Grid::new();
        grid.set(c, state);
        prop_assert_eq!(grid.get(c), state);
        let others = grid
            .iter()
            .filter(|&(o, s)| o != c && s != CellState::Empty)
            .count();
        prop_assert_eq!(others, 0);
    }

    #[test]
    fn coords_exist_only_on_the_board(x in -20i32..30, y in -20i32..30) {
        let on_board = (0..10).contains(&x) && (0..10).contains(&y);
        prop_assert_eq!(Coord::new(x, y).is_some(), on_board);
    }

    #[test]
    fn neighbors_are_adjacent_and_on_board(x in 0i32..10, y in 0i32..10) {
        let c = Coord::new(x, y).unwrap();
        for n in c.neighbors() {
            let dx = (n.x() as i32 - x).abs();
            let dy = (n.y() as i32 - y).abs();
            prop_assert!(dx <= 1 && dy <= 1 && (dx, dy) != (0, 0));
        }
    }
}

#[test]
fn out_of_range_positions_cannot_be_built() {
    assert!(Coord::new(-1, 0).is_none());
    assert!(Coord::new(10, 5).is_none());
    assert!(Coord::new(0, 10).is_none());
    assert!(Coord::new(9, 9).is_some());
}

#[test]
fn text_coordinates() {
    let c: Coord = "C5".parse().unwrap();
    assert_eq!((c.x(), c.y()), (2, 4));
    assert_eq!(" a10 ".parse::<Coord>().unwrap().to_string(), "A10");
    for bad in ["", "K1", "A0", "A11", "5C", "B", "A+5", "A05", "A010"] {
        assert!(bad.parse::<Coord>().is_err(), "{:?} should not parse", bad);
    }
}

#[test]
fn neighbor_counts_at_corner_edge_and_center() {
    let count = |x, y| Coord::new(x, y).unwrap().neighbors().count();
    assert_eq!(count(0, 0), 3);
    assert_eq!(count(9, 9), 3);
    assert_eq!(count(0, 5), 5);
    assert_eq!(count(5, 5), 8);
}

#[test]
fn scans_see_every_cell() {
    let mut grid = Grid::new();
    grid.set(Coord::new(1, 1).unwrap(), CellState::Ship);
    grid.set(Coord::new(8, 3).unwrap(), CellState::Ship);
    grid.set(Coord::new(4, 4).unwrap(), CellState::Miss);

    let mut visited = 0;
    grid.for_each(|_, _| visited += 1);
    assert_eq!(visited, 100);
    assert_eq!(grid.count(CellState::Ship), 2);
    assert_eq!(grid.count(CellState::Empty), 97);
    assert!(grid.contains(CellState::Miss));
    assert!(!grid.contains(CellState::Sunk));
    assert_eq!(
        grid.coords_with(CellState::Ship),
        vec![Coord::new(1, 1).unwrap(), Coord::new(8, 3).unwrap()]
    );
}
