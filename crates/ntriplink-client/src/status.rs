//! Duration formatting for status output.

const MS_PER_SECOND: u64 = 1000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Format a millisecond duration as `days hh:mm:ss.mmm`.
pub fn format_uptime(mut milliseconds: u64) -> String {
    let days = milliseconds / MS_PER_DAY;
    milliseconds %= MS_PER_DAY;

    let hours = milliseconds / MS_PER_HOUR;
    milliseconds %= MS_PER_HOUR;

    let minutes = milliseconds / MS_PER_MINUTE;
    milliseconds %= MS_PER_MINUTE;

    let seconds = milliseconds / MS_PER_SECOND;
    milliseconds %= MS_PER_SECOND;

    format!("{days} {hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
}

/// Format a backoff delay for human eyes: whole seconds up to a minute,
/// whole minutes beyond.
pub fn format_delay(milliseconds: u64) -> String {
    let seconds = milliseconds / MS_PER_SECOND;
    if seconds <= 60 {
        format!("{seconds} seconds")
    } else {
        format!("{} minutes", seconds / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_uptime() {
        assert_eq!(format_uptime(0), "0 00:00:00.000");
    }

    #[test]
    fn sub_second_uptime() {
        assert_eq!(format_uptime(42), "0 00:00:00.042");
    }

    #[test]
    fn mixed_uptime() {
        // 1 day, 2 hours, 3 minutes, 4 seconds, 5 ms
        let ms = MS_PER_DAY + 2 * MS_PER_HOUR + 3 * MS_PER_MINUTE + 4 * MS_PER_SECOND + 5;
        assert_eq!(format_uptime(ms), "1 02:03:04.005");
    }

    #[test]
    fn multi_day_uptime() {
        assert_eq!(format_uptime(10 * MS_PER_DAY), "10 00:00:00.000");
    }

    #[test]
    fn delay_in_seconds_and_minutes() {
        assert_eq!(format_delay(0), "0 seconds");
        assert_eq!(format_delay(15_000), "15 seconds");
        assert_eq!(format_delay(60_000), "60 seconds");
        assert_eq!(format_delay(120_000), "2 minutes");
        assert_eq!(format_delay(600_000), "10 minutes");
    }
}
