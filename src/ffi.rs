use std::ffi::{c_char, c_int, CStr};

use crate::config::{MAX_COUNT, MIN_COUNT};
use crate::solver::fault_boundary;
use crate::{InputError, SolveError, Solver};

unsafe fn read_numeral<'a>(ptr: *const c_char, what: &'static str) -> Result<&'a str, SolveError> {
    if ptr.is_null() {
        return Err(InputError::NullArgument(what).into());
    }
    let numeral = CStr::from_ptr(ptr);
    numeral
        .to_str()
        .map_err(|_| InputError::MalformedNumeral(numeral.to_string_lossy().into_owned()).into())
}

unsafe fn solve_into(
    n: c_int,
    out_messages: *const *mut c_char,
    prime: *const c_char,
    sums: *const *const c_char,
) -> Result<(), SolveError> {
    // The count bounds every read below, so it is checked first.
    let count = usize::try_from(n).unwrap_or(0);
    if !(MIN_COUNT..=MAX_COUNT).contains(&count) {
        return Err(InputError::CountOutOfRange {
            count,
            min: MIN_COUNT,
            max: MAX_COUNT,
        }
        .into());
    }
    if out_messages.is_null() {
        return Err(InputError::NullArgument("output buffer array").into());
    }
    if sums.is_null() {
        return Err(InputError::NullArgument("power sum array").into());
    }

    let prime = read_numeral(prime, "prime")?;
    let sums = std::slice::from_raw_parts(sums, count)
        .iter()
        .map(|&sum| read_numeral(sum, "power sum"))
        .collect::<Result<Vec<_>, _>>()?;
    let buffers = std::slice::from_raw_parts(out_messages, count);
    if let Some(i) = buffers.iter().position(|buffer| buffer.is_null()) {
        return Err(InputError::NullBuffer(i).into());
    }

    let values = Solver::new().solve_decimal(count, prime, &sums)?;
    for (&buffer, value) in buffers.iter().zip(values.iter()) {
        // solve_decimal guarantees value.len() <= prime.len()
        std::ptr::copy_nonoverlapping(value.as_ptr() as *const c_char, buffer, value.len());
        *buffer.add(value.len()) = 0;
    }
    Ok(())
}

/// Recovers `n` values from their first `n` power sums modulo `prime`.
///
/// On success writes the sorted values as NUL-terminated base-10 numerals
/// into `out_messages` and returns `out_messages`. On any failure returns
/// null, and the buffer contents are unspecified.
///
/// # Safety
///
/// `prime` must be a NUL-terminated string. `sums` and `out_messages` must
/// each point to `n` pointers. Every `sums[i]` must be a NUL-terminated
/// string, and every `out_messages[i]` must be writable for at least
/// `strlen(prime) + 1` bytes.
#[no_mangle]
pub unsafe extern "C" fn psum_solve(
    n: c_int,
    out_messages: *const *mut c_char,
    prime: *const c_char,
    sums: *const *const c_char,
) -> *const *mut c_char {
    match fault_boundary(|| solve_into(n, out_messages, prime, sums)) {
        Ok(()) => out_messages,
        Err(e) => {
            debug!("psum_solve failed: {}", e);
            std::ptr::null()
        }
    }
}
