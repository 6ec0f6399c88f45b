//! Instructions sent to the language model for the correction and extraction stages.

pub fn correction(raw_text: &str) -> String {
    format!(
        "أنت مساعد متخصص في تصحيح نصوص OCR لبطاقات الرقم القومي المصرية (جمهوريه مصر العربيه).

المهمة: تصحيح أخطاء OCR في النص المستخرج من بطاقة الرقم القومي المصرية.

قواعد التصحيح:
1. فصل الكلمات الملتصقة (مثل: \"جمهوريهمصل\" → \"جمهوريه مصر\")
2. تصحيح الأخطاء الإملائية الشائعة
3. الحفاظ على الأرقام والتواريخ كما هي
4. لا تضف معلومات غير موجودة في النص الأصلي

النص المستخرج:
{raw_text}

أرجع النص المصحح فقط بدون شرح."
    )
}

pub fn field_extraction(corrected_text: &str) -> String {
    format!(
        "أنت مساعد متخصص في استخراج بيانات بطاقات الرقم القومي المصرية.

المهمة: استخراج البيانات التالية من النص وإرجاعها بصيغة JSON:

الحقول المطلوبة:
- name: الاسم الكامل
- national_id: الرقم القومي (14 رقم)
- address: العنوان الكامل
- date_of_birth: تاريخ الميلاد
- gender: النوع (ذكر/أنثى)
- religion: الديانة
- marital_status: الحالة الزوجية
- expiry_date: تاريخ انتهاء البطاقة (ساريه حتي)
- job: الوظيفة/المهنة

النص:
{corrected_text}

أرجع JSON فقط بدون أي نص إضافي. إذا لم يتوفر حقل، اتركه فارغاً (null)."
    )
}
