use crate::{RecordError, schema::Coord};

/// Per-round coordinate remapping of the shuffling game variant.
///
/// `layers[r][y][x]` is the coordinate, in the layout of round `r + 1`, of the
/// cell displayed at `(x, y)` in round `r + 2`. Round 1 shows the original
/// layout.
#[derive(Debug, Clone, Default)]
pub struct ShuffleTable {
    layers: Vec<Vec<Vec<Coord>>>,
}

impl ShuffleTable {
    #[must_use]
    pub fn new(layers: Vec<Vec<Vec<Coord>>>) -> Self {
        Self { layers }
    }

    /// Maps a coordinate displayed in `round` (starting at 1) back to the
    /// original layout by walking the table backward one round at a time.
    ///
    /// The walk takes exactly `round - 1` steps. A step whose coordinate is
    /// missing from the table is an error.
    pub fn original_coordinates(&self, round: usize, coord: Coord) -> Result<Coord, RecordError> {
        let mut coord = coord;
        for current in (2..=round).rev() {
            coord = self
                .layers
                .get(current - 2)
                .and_then(|layer| layer.get(coord.y))
                .and_then(|row| row.get(coord.x))
                .copied()
                .ok_or(RecordError::MissingShuffleEntry {
                    round: current,
                    x: coord.x,
                    y: coord.y,
                })?;
        }
        Ok(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_layer(size: usize) -> Vec<Vec<Coord>> {
        (0..size)
            .map(|y| (0..size).map(|x| Coord { x, y }).collect())
            .collect()
    }

    /// Layer where every cell comes from its horizontal mirror.
    fn mirror_layer(size: usize) -> Vec<Vec<Coord>> {
        (0..size)
            .map(|y| (0..size).map(|x| Coord { x: size - 1 - x, y }).collect())
            .collect()
    }

    #[test]
    fn test_identity_table_keeps_coordinates() {
        let table = ShuffleTable::new(vec![identity_layer(3); 5]);
        for round in 1..=6 {
            for y in 0..3 {
                for x in 0..3 {
                    let coord = Coord { x, y };
                    assert_eq!(table.original_coordinates(round, coord).unwrap(), coord);
                }
            }
        }
    }

    #[test]
    fn test_round_one_needs_no_table() {
        let table = ShuffleTable::default();
        let coord = Coord { x: 4, y: 2 };
        assert_eq!(table.original_coordinates(1, coord).unwrap(), coord);
    }

    #[test]
    fn test_walks_every_previous_round() {
        let table = ShuffleTable::new(vec![mirror_layer(3), identity_layer(3), mirror_layer(3)]);
        let coord = Coord { x: 0, y: 1 };
        // two mirrors cancel out
        assert_eq!(table.original_coordinates(4, coord).unwrap(), coord);
        // round 3 walks through the identity and one mirror
        assert_eq!(
            table.original_coordinates(3, coord).unwrap(),
            Coord { x: 2, y: 1 }
        );
    }

    #[test]
    fn test_missing_layer_is_an_error() {
        let table = ShuffleTable::new(vec![identity_layer(2)]);
        let err = table
            .original_coordinates(3, Coord { x: 1, y: 1 })
            .unwrap_err();
        assert!(matches!(
            err,
            RecordError::MissingShuffleEntry { round: 3, .. }
        ));
    }

    #[test]
    fn test_coordinate_outside_layer_is_an_error() {
        let table = ShuffleTable::new(vec![identity_layer(2)]);
        let err = table
            .original_coordinates(2, Coord { x: 5, y: 0 })
            .unwrap_err();
        assert!(matches!(
            err,
            RecordError::MissingShuffleEntry { round: 2, x: 5, y: 0 }
        ));
    }
}
