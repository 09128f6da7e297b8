use bytes::Bytes;

use crate::frame::Frame;

/// Builder for a request frame: a command name followed by its arguments,
/// serialized as an array of bulk strings.
///
/// ```
/// use rudis::cmd::cmd;
///
/// let frame = cmd("SET").arg("key").arg("value").into_frame();
/// ```
#[derive(Debug)]
pub struct Cmd {
    parts: Vec<Frame>,
}

pub fn cmd(name: &str) -> Cmd {
    Cmd {
        parts: vec![Frame::Bulk(Bytes::copy_from_slice(name.as_bytes()))],
    }
}

impl Cmd {
    pub fn arg(mut self, arg: impl ToArg) -> Cmd {
        self.parts.push(Frame::Bulk(arg.to_arg()));
        self
    }

    pub fn args<I>(mut self, args: I) -> Cmd
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        for arg in args {
            self.parts.push(Frame::Bulk(arg.to_arg()));
        }
        self
    }

    pub fn into_frame(self) -> Frame {
        Frame::Array(self.parts)
    }
}

/// Conversion of command arguments to their wire representation. Everything
/// Redis receives is a byte string; numbers are sent in their decimal form
/// and scores at the infinities as `+inf`/`-inf`.
pub trait ToArg {
    fn to_arg(&self) -> Bytes;
}

impl<T: ToArg + ?Sized> ToArg for &T {
    fn to_arg(&self) -> Bytes {
        (**self).to_arg()
    }
}

impl ToArg for str {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for String {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for Bytes {
    fn to_arg(&self) -> Bytes {
        self.clone()
    }
}

impl ToArg for [u8] {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for Vec<u8> {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

macro_rules! to_arg_via_to_string {
    ($($t:ty),*) => {
        $(
            impl ToArg for $t {
                fn to_arg(&self) -> Bytes {
                    Bytes::from(self.to_string())
                }
            }
        )*
    };
}

to_arg_via_to_string!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl ToArg for f64 {
    fn to_arg(&self) -> Bytes {
        if self.is_infinite() {
            return Bytes::from_static(if *self > 0.0 { b"+inf" } else { b"-inf" });
        }
        Bytes::from(self.to_string())
    }
}
