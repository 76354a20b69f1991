//! Grouping of encapsulated pixel data fragments into frames.
use dwv_core::value::PixelFragmentSequence;
use std::borrow::Cow;
use std::ops::Range;

/// Assign the fragments of an encapsulated pixel data element to frames.
///
/// Returns, for each frame, the indices of its fragments.
///
/// The Basic Offset Table is used when present.
/// Without it, each fragment makes one frame
/// if there are as many fragments as frames,
/// and otherwise all fragments make up a single frame.
pub fn frame_fragments(sequence: &PixelFragmentSequence, number_of_frames: u32) -> Vec<Vec<usize>> {
    let fragments = sequence.fragments();
    if fragments.is_empty() {
        return Vec::new();
    }
    let table = sequence.offset_table();
    if !table.is_empty() {
        // offsets are measured from the first fragment item header,
        // each item header taking 8 bytes
        let mut starts = Vec::with_capacity(fragments.len());
        let mut offset = 0_u64;
        for fragment in fragments {
            starts.push(offset);
            offset += 8 + fragment.len() as u64;
        }
        let mut frames: Vec<Vec<usize>> = Vec::with_capacity(table.len());
        for (i, &frame_start) in table.iter().enumerate() {
            let frame_end = table.get(i + 1).map(|&e| u64::from(e)).unwrap_or(u64::MAX);
            frames.push(
                starts
                    .iter()
                    .enumerate()
                    .filter(|(_, &s)| s >= u64::from(frame_start) && s < frame_end)
                    .map(|(index, _)| index)
                    .collect(),
            );
        }
        return frames;
    }
    if fragments.len() == number_of_frames as usize {
        (0..fragments.len()).map(|i| vec![i]).collect()
    } else {
        vec![(0..fragments.len()).collect()]
    }
}

/// The byte ranges in the source buffer of each fragment of each frame.
///
/// Empty if the sequence was not decoded from a buffer.
pub fn frame_ranges(
    sequence: &PixelFragmentSequence,
    number_of_frames: u32,
) -> Vec<Vec<Range<usize>>> {
    let ranges = sequence.fragment_ranges();
    if ranges.len() != sequence.fragments().len() {
        return Vec::new();
    }
    frame_fragments(sequence, number_of_frames)
        .into_iter()
        .map(|frame| frame.into_iter().map(|i| ranges[i].clone()).collect())
        .collect()
}

/// The compressed bytes of each frame.
///
/// Frames made of a single fragment are borrowed,
/// others are concatenated.
pub fn frame_data(sequence: &PixelFragmentSequence, number_of_frames: u32) -> Vec<Cow<'_, [u8]>> {
    let fragments = sequence.fragments();
    frame_fragments(sequence, number_of_frames)
        .into_iter()
        .map(|frame| match frame.as_slice() {
            [single] => Cow::Borrowed(fragments[*single].as_slice()),
            indices => Cow::Owned(
                indices
                    .iter()
                    .flat_map(|&i| fragments[i].iter().copied())
                    .collect(),
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_fragment_per_frame() {
        let seq = PixelFragmentSequence::new(Vec::<u32>::new(), vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(frame_fragments(&seq, 2), vec![vec![0], vec![1]]);
        let data = frame_data(&seq, 2);
        assert_eq!(data[1].as_ref(), &[3, 4]);
    }

    #[test]
    fn single_frame_from_many_fragments() {
        let seq = PixelFragmentSequence::new(Vec::<u32>::new(), vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(frame_fragments(&seq, 1), vec![vec![0, 1]]);
        assert_eq!(frame_data(&seq, 1)[0].as_ref(), &[1, 2, 3, 4]);
    }

    #[test]
    fn offset_table_groups_fragments() {
        // frame 0 has two fragments of 4 bytes, frame 1 starts at 2 * (8 + 4)
        let seq = PixelFragmentSequence::new(
            vec![0_u32, 24],
            vec![vec![1, 1, 1, 1], vec![2, 2, 2, 2], vec![3, 3]],
        );
        assert_eq!(frame_fragments(&seq, 2), vec![vec![0, 1], vec![2]]);
        assert!(frame_ranges(&seq, 2).is_empty());
    }
}
