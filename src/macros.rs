//===========================================================================//

// Both macros return early from the enclosing function with an `io::Error`
// whose message is built like `format!`.

macro_rules! invalid_data {
    ($($arg:tt)+) => {
        return Err(::std::io::Error::new(
            ::std::io::ErrorKind::InvalidData,
            format!($($arg)+),
        ))
    };
}

macro_rules! invalid_input {
    ($($arg:tt)+) => {
        return Err(::std::io::Error::new(
            ::std::io::ErrorKind::InvalidInput,
            format!($($arg)+),
        ))
    };
}

//===========================================================================//
