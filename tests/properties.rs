use dynarray::DynamicArray;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Push(i32),
    Pop,
    RemoveLast,
    Reserve(usize),
    Resize(usize),
    Truncate(usize),
    ShrinkToFit,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Push),
        1 => Just(Op::Pop),
        1 => Just(Op::RemoveLast),
        1 => (0usize..200).prop_map(Op::Reserve),
        1 => (0usize..100).prop_map(Op::Resize),
        1 => (0usize..100).prop_map(Op::Truncate),
        1 => Just(Op::ShrinkToFit),
    ]
}

proptest! {
    #[test]
    fn pushes_are_indexable(values in prop::collection::vec(any::<i64>(), 0..500)) {
        let mut array = DynamicArray::new();
        for &value in &values {
            array.push(value);
        }
        prop_assert_eq!(array.len(), values.len());
        prop_assert!(array.capacity() >= array.len());
        for (i, value) in values.iter().enumerate() {
            prop_assert_eq!(array[i], *value);
        }
    }

    #[test]
    fn reserve_never_touches_elements(
        values in prop::collection::vec(any::<u16>(), 0..64),
        capacity in 0usize..128,
    ) {
        let mut array: DynamicArray<u16> = values.iter().copied().collect();
        let old_capacity = array.capacity();
        array.reserve(capacity);

        prop_assert_eq!(array.as_slice(), values.as_slice());
        if capacity < values.len() {
            prop_assert_eq!(array.capacity(), old_capacity);
        } else {
            prop_assert_eq!(array.capacity(), capacity);
        }
    }

    #[test]
    fn resize_keeps_prefix(
        values in prop::collection::vec(any::<u8>(), 0..64),
        new_size in 0usize..128,
    ) {
        let mut array: DynamicArray<u8> = values.iter().copied().collect();
        array.resize(new_size);

        prop_assert_eq!(array.len(), new_size);
        let kept = new_size.min(values.len());
        prop_assert_eq!(&array[..kept], &values[..kept]);
        prop_assert!(array[kept..].iter().all(|&value| value == 0));
    }

    #[test]
    fn clone_is_equal_and_independent(values in prop::collection::vec(any::<i32>(), 1..64)) {
        let source: DynamicArray<i32> = values.iter().copied().collect();
        let mut copy = source.clone();
        prop_assert_eq!(&copy, &source);

        for value in copy.iter_mut() {
            *value = value.wrapping_add(1);
        }
        prop_assert_eq!(source.as_slice(), values.as_slice());
    }

    #[test]
    fn take_moves_everything(values in prop::collection::vec(any::<i32>(), 0..64)) {
        let mut source: DynamicArray<i32> = values.iter().copied().collect();
        let destination = source.take();

        prop_assert_eq!(source.len(), 0);
        prop_assert_eq!(source.capacity(), 0);
        prop_assert_eq!(destination.as_slice(), values.as_slice());
    }

    #[test]
    fn behaves_like_vec(ops in prop::collection::vec(arb_op(), 0..200)) {
        let mut array = DynamicArray::new();
        let mut model: Vec<i32> = Vec::new();

        for op in ops {
            match op {
                Op::Push(value) => {
                    array.push(value);
                    model.push(value);
                }
                Op::Pop => {
                    prop_assert_eq!(array.pop(), model.pop());
                }
                Op::RemoveLast => {
                    if !model.is_empty() {
                        array.remove_last();
                        model.pop();
                    }
                }
                Op::Reserve(capacity) => array.reserve(capacity),
                Op::Resize(new_size) => {
                    array.resize(new_size);
                    model.resize(new_size, 0);
                }
                Op::Truncate(new_len) => {
                    array.truncate(new_len);
                    model.truncate(new_len);
                }
                Op::ShrinkToFit => {
                    array.shrink_to_fit();
                    prop_assert_eq!(array.capacity(), model.len());
                }
            }

            prop_assert!(array.capacity() >= array.len());
            prop_assert_eq!(array.as_slice(), model.as_slice());
        }

        let iterated: Vec<i32> = array.into_iter().collect();
        prop_assert_eq!(iterated, model);
    }
}
