//! Dispatch for loosely-typed host calls.
//!
//! A host binding marshals its arguments into [`Arg`] values and hands the
//! whole list to [`Engine::compress_args`] or [`Engine::decompress_args`].
//! The argument count selects the call shape: two arguments for
//! `(input, output)`, five for
//! `(input, src_offset, src_len, output, out_offset)`. The shape is fully
//! validated before any buffer is touched.

use crate::decompress::Decompressed;
use crate::engine::Engine;
use crate::error::{ArgumentError, EngineError, Operation};
use crate::resolve::CallShape;

/// One marshaled host argument.
#[derive(Debug)]
pub enum Arg<'a> {
    Buffer(&'a mut [u8]),
    Integer(i64),
    /// Anything else; carries the host type name for diagnostics.
    Other(&'static str),
}

type Parsed<'s> = (&'s [u8], &'s mut [u8], CallShape);

fn parse<'s>(operation: Operation, args: &'s mut [Arg<'_>]) -> Result<Parsed<'s>, ArgumentError> {
    let got = args.len();
    match args {
        [input, output] => {
            let input: &[u8] = buffer(input, 1)?;
            let output = buffer(output, 2)?;
            Ok((input, output, CallShape::Whole))
        }
        [input, src_offset, src_len, output, out_offset] => {
            let input: &[u8] = buffer(input, 1)?;
            let output = buffer(output, 4)?;
            let shape = CallShape::Sliced {
                src_offset: integer(src_offset, 2, "src_offset")?,
                src_len: integer(src_len, 3, "src_len")?,
                out_offset: integer(out_offset, 5, "out_offset")?,
            };
            Ok((input, output, shape))
        }
        _ => Err(ArgumentError::Arity { operation, got }),
    }
}

fn buffer<'s>(arg: &'s mut Arg<'_>, position: usize) -> Result<&'s mut [u8], ArgumentError> {
    match arg {
        Arg::Buffer(bytes) => Ok(&mut **bytes),
        _ => Err(ArgumentError::NotABuffer { position }),
    }
}

fn integer(arg: &Arg<'_>, position: usize, name: &'static str) -> Result<usize, ArgumentError> {
    match *arg {
        Arg::Integer(value) => usize::try_from(value).map_err(|_| ArgumentError::OutOfRange {
            position,
            name,
            value,
            limit: usize::MAX,
        }),
        _ => Err(ArgumentError::NotAnInteger { position }),
    }
}

impl Engine {
    /// Compress with host-marshaled arguments.
    pub fn compress_args(&self, args: &mut [Arg<'_>]) -> Result<usize, EngineError> {
        let (input, output, shape) = parse(Operation::Compress, args)?;
        self.compress_with(input, output, shape)
    }

    /// Decompress with host-marshaled arguments.
    pub fn decompress_args(&self, args: &mut [Arg<'_>]) -> Result<Decompressed, EngineError> {
        let (input, output, shape) = parse(Operation::Decompress, args)?;
        self.decompress_with(input, output, shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_arguments_select_whole_shape() {
        let mut input = [1u8, 2, 3];
        let mut output = [0u8; 4];
        let mut args = [Arg::Buffer(&mut input), Arg::Buffer(&mut output)];
        let (input, output, shape) = parse(Operation::Compress, &mut args).unwrap();
        assert_eq!(input.len(), 3);
        assert_eq!(output.len(), 4);
        assert_eq!(shape, CallShape::Whole);
    }

    #[test]
    fn test_five_arguments_select_sliced_shape() {
        let mut input = [0u8; 16];
        let mut output = [0u8; 16];
        let mut args = [
            Arg::Buffer(&mut input),
            Arg::Integer(10),
            Arg::Integer(5),
            Arg::Buffer(&mut output),
            Arg::Integer(3),
        ];
        let (_, _, shape) = parse(Operation::Decompress, &mut args).unwrap();
        assert_eq!(
            shape,
            CallShape::Sliced {
                src_offset: 10,
                src_len: 5,
                out_offset: 3
            }
        );
    }

    #[test]
    fn test_other_arities_are_rejected() {
        let mut a = [0u8; 4];
        let mut b = [0u8; 4];
        let mut c = [0u8; 4];
        let mut d = [0u8; 4];
        let mut args = [
            Arg::Buffer(&mut a),
            Arg::Buffer(&mut b),
            Arg::Buffer(&mut c),
            Arg::Buffer(&mut d),
        ];
        for n in [0, 1, 3, 4] {
            let err = parse(Operation::Compress, &mut args[..n]).unwrap_err();
            assert_eq!(
                err,
                ArgumentError::Arity {
                    operation: Operation::Compress,
                    got: n
                }
            );
        }
    }

    #[test]
    fn test_non_buffer_positions_are_named() {
        let mut buf = [0u8; 4];
        let mut args = [Arg::Other("string"), Arg::Buffer(&mut buf)];
        assert_eq!(
            parse(Operation::Compress, &mut args).unwrap_err(),
            ArgumentError::NotABuffer { position: 1 }
        );

        let mut buf = [0u8; 4];
        let mut args = [
            Arg::Buffer(&mut buf),
            Arg::Integer(0),
            Arg::Integer(0),
            Arg::Integer(7),
            Arg::Integer(0),
        ];
        assert_eq!(
            parse(Operation::Decompress, &mut args).unwrap_err(),
            ArgumentError::NotABuffer { position: 4 }
        );
    }

    #[test]
    fn test_integer_positions_are_checked() {
        let mut input = [0u8; 4];
        let mut output = [0u8; 4];
        let mut args = [
            Arg::Buffer(&mut input),
            Arg::Integer(0),
            Arg::Other("object"),
            Arg::Buffer(&mut output),
            Arg::Integer(0),
        ];
        assert_eq!(
            parse(Operation::Compress, &mut args).unwrap_err(),
            ArgumentError::NotAnInteger { position: 3 }
        );
    }

    #[test]
    fn test_negative_integers_are_out_of_range() {
        let mut input = [0u8; 4];
        let mut output = [0u8; 4];
        let mut args = [
            Arg::Buffer(&mut input),
            Arg::Integer(0),
            Arg::Integer(4),
            Arg::Buffer(&mut output),
            Arg::Integer(-1),
        ];
        assert!(matches!(
            parse(Operation::Compress, &mut args).unwrap_err(),
            ArgumentError::OutOfRange {
                position: 5,
                value: -1,
                ..
            }
        ));
    }
}
