//! Fixed user-facing vocabulary
//!
//! Replies and transcripts are produced in Arabic with English subject
//! labels. Everything shown to a requester comes from this module.

/// Placeholder for absent values
pub const MISSING: &str = "-";

/// Placeholder for absent identity fields in the transcript
pub const NOT_AVAILABLE: &str = "N/A";

pub const PASS_MARK: &str = "✅";
pub const FAIL_MARK: &str = "❌";

// Text summary labels
pub const LABEL_COHORT: &str = "📅 السنة";
pub const LABEL_NAME: &str = "👤 الاسم";
pub const LABEL_IDENTIFIER: &str = "🔢 رقم الجلوس";

// Transcript labels
pub const TITLE: &str = "نتيجة الصف التاسع للعام";
pub const LABEL_SEAT: &str = "رقم الجلوس";
pub const LABEL_YEAR: &str = "العام";
pub const LABEL_SCHOOL: &str = "المدرسة";
pub const LABEL_DIRECTORATE: &str = "المديرية";
pub const LABEL_STUDENT: &str = "اسم الطالب";
pub const LABEL_BIRTH_PLACE: &str = "محل الميلاد";
pub const LABEL_BIRTH_DATE: &str = "تاريخ الميلاد";
pub const LABEL_TRANSCRIPT: &str = "درجات المواد / TRANSCRIPT";
pub const LABEL_SUBJECTS: &str = "المواد الدراسية";
pub const LABEL_MAX: &str = "النهاية الكبرى";
pub const LABEL_MIN: &str = "النهاية الصغرى";
pub const LABEL_GRADE: &str = "الدرجة المستحقة";
pub const LABEL_TOTAL: &str = "المجموع";
pub const LABEL_AVERAGE: &str = "المعدل";
pub const LABEL_FINAL_RESULT: &str = "النتيجة النهائية";
pub const LABEL_REMARKS: &str = "الملاحظات";
pub const UNOFFICIAL_NOTICE: &str = "لا يعتبر هذا البيان وثيقة رسمية.";
pub const NOTICE_PREFIX: &str = "*ملاحظة : ";
pub const PRINT_BUTTON: &str = "طباعة النتيجة";

// Replies
pub const EMPTY_QUERY: &str = "❌ أرسل رقم الجلوس أو الاسم.";
pub const UNROUTABLE: &str = "❌ الرقم لا يطابق أي سنة دراسية معروفة.";
pub const ID_NOT_FOUND: &str = "❌ لم يتم العثور على نتيجة بهذا الرقم.";
pub const NAME_NOT_FOUND: &str = "❌ لم يتم العثور على أي نتائج تطابق هذا الاسم.";
pub const NO_MORE_RESULTS: &str = "ℹ️ لا توجد نتائج إضافية.";
pub const NOTHING_TO_CONTINUE: &str = "ℹ️ لا يوجد بحث سابق. أرسل الاسم أولاً.";
pub const UNKNOWN_COHORT: &str = "❌ السنة الدراسية غير معروفة.";
pub const UNAUTHORIZED: &str = "⛔ كلمة السر غير صحيحة.";
pub const MALFORMED_SOURCE: &str = "❌ تعذر قراءة الملف";
pub const INTERNAL_ERROR: &str = "⚠️ حدث خطأ أثناء المعالجة. حاول مرة أخرى.";
pub const UPDATE_DONE: &str = "✅ تم تحديث بيانات";

/// Summary line preceding the first batch of a name search
pub fn matches_found(total: usize, shown: usize) -> String {
    format!(
        "🔍 تم العثور على {} نتيجة، سيتم إرسال {} منها. أرسل /more للمزيد.",
        total, shown
    )
}

/// Success report for a dataset update
pub fn update_done(cohort_key: &str, rows_received: usize) -> String {
    format!("{} {}: {} صف جديد", UPDATE_DONE, cohort_key, rows_received)
}

// Welcome message
pub const WELCOME_HEADER: &str = "👋 مرحباً بك في خدمة نتائج الامتحانات";
pub const WELCOME_COHORTS: &str = "📚 البيانات المتاحة:";
pub const WELCOME_ROUTES: &str = "🔢 أرقام الجلوس حسب أول رقم:";
pub const WELCOME_USAGE: &str = "✍️ أرسل رقم الجلوس أو الاسم للبحث، وأرسل /more لعرض المزيد من النتائج.";

pub fn welcome_cohort_line(cohort_key: &str, rows: usize) -> String {
    format!("• {}: {} طالب", cohort_key, rows)
}

pub fn welcome_total_line(rows: usize) -> String {
    format!("📊 الإجمالي: {} طالب", rows)
}

pub fn welcome_route_line(digit: char, cohort_key: &str) -> String {
    format!("• {} ← {}", digit, cohort_key)
}
